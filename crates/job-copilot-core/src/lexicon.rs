//! Static skill lexicons.
//!
//! Entries are in canonical casing; matching results are always reported
//! with this casing. Declaration order is the fuzzy tie-break order.

/// Concrete technical competencies: languages, frameworks, platforms, tools.
pub const HARD_SKILLS: &[&str] = &[
    "Python",
    "PyTorch",
    "TensorFlow",
    "NumPy",
    "Pandas",
    "scikit-learn",
    "Jupyter",
    "Transformers",
    "BERT",
    "Llama",
    "RAG",
    "LangChain",
    "Ollama",
    "OpenAI",
    "Hugging Face",
    "Vector DB",
    "Chroma",
    "FAISS",
    "Pinecone",
    "Weaviate",
    "Milvus",
    "Docker",
    "FastAPI",
    "Flask",
    "REST API",
    "GraphQL",
    "MLflow",
    "Weights & Biases",
    "W&B",
    "Ray",
    "Dask",
    "LLM",
    "Prompt Engineering",
    "Reranking",
    "Guardrails",
    "Retrieval",
    "Chunking",
    "CI/CD",
    "GCP",
    "AWS",
    "Azure",
    "Kubernetes",
    "GPU",
    "CUDA",
    "ROS2",
    "Gazebo",
    "PDDL",
    "Fast Downward",
    "PlanSys2",
    "OpenCV",
];

/// Interpersonal and behavioral competencies.
pub const SOFT_SKILLS: &[&str] = &[
    "Communication",
    "Collaboration",
    "Leadership",
    "Problem solving",
    "Stakeholder management",
    "Teamwork",
    "Time management",
    "Attention to detail",
    "Documentation",
    "Mentoring",
    "Ownership",
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_lexicons_are_disjoint_and_unique() {
        let hard: HashSet<String> = HARD_SKILLS.iter().map(|s| s.to_lowercase()).collect();
        let soft: HashSet<String> = SOFT_SKILLS.iter().map(|s| s.to_lowercase()).collect();
        assert_eq!(hard.len(), HARD_SKILLS.len());
        assert_eq!(soft.len(), SOFT_SKILLS.len());
        assert!(hard.is_disjoint(&soft));
    }
}
