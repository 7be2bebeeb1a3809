//! Static curriculum, question bank and project catalogues.
//!
//! Subject keys are lowercase with underscores (`machine_learning`); lookups
//! normalize user input the same way.

use crate::model::study::Level;
use serde::Serialize;

/// Subjects with a full three-tier curriculum.
pub const SUBJECTS: [&str; 3] = ["nlp", "python", "machine_learning"];

const NLP_BEGINNER: &[&str] = &[
    "Text preprocessing",
    "Tokenization",
    "Stop words removal",
    "Stemming and Lemmatization",
    "Bag of Words",
    "TF-IDF",
];
const NLP_INTERMEDIATE: &[&str] = &[
    "Word embeddings",
    "Word2Vec",
    "GloVe",
    "Sentiment analysis",
    "Named Entity Recognition",
    "Part-of-speech tagging",
];
const NLP_ADVANCED: &[&str] = &[
    "BERT and Transformers",
    "GPT models",
    "Attention mechanism",
    "Sequence-to-sequence models",
    "Transfer learning in NLP",
];

const PYTHON_BEGINNER: &[&str] = &[
    "Variables and data types",
    "Control structures",
    "Functions",
    "Lists and dictionaries",
    "File handling",
    "Exception handling",
];
const PYTHON_INTERMEDIATE: &[&str] = &[
    "Object-oriented programming",
    "Decorators",
    "Generators",
    "Regular expressions",
    "Working with APIs",
    "Database connections",
];
const PYTHON_ADVANCED: &[&str] = &[
    "Metaclasses",
    "Async programming",
    "Performance optimization",
    "Design patterns",
    "Testing frameworks",
    "Package development",
];

const ML_BEGINNER: &[&str] = &[
    "Supervised vs Unsupervised learning",
    "Linear regression",
    "Logistic regression",
    "Decision trees",
    "Cross-validation",
];
const ML_INTERMEDIATE: &[&str] = &[
    "Random forests",
    "SVM",
    "K-means clustering",
    "Neural networks",
    "Feature engineering",
    "Model evaluation metrics",
];
const ML_ADVANCED: &[&str] = &[
    "Deep learning",
    "Convolutional networks",
    "Recurrent networks",
    "Ensemble methods",
    "Hyperparameter tuning",
    "MLOps",
];

/// Normalizes a subject name to its curriculum key.
pub fn subject_key(subject: &str) -> String {
    subject.trim().to_lowercase().replace(' ', "_")
}

/// Topics for one subject tier, or `None` when the pair is unknown.
pub fn topics(subject: &str, level: Level) -> Option<&'static [&'static str]> {
    let tiers = match subject_key(subject).as_str() {
        "nlp" => [NLP_BEGINNER, NLP_INTERMEDIATE, NLP_ADVANCED],
        "python" => [PYTHON_BEGINNER, PYTHON_INTERMEDIATE, PYTHON_ADVANCED],
        "machine_learning" => [ML_BEGINNER, ML_INTERMEDIATE, ML_ADVANCED],
        _ => return None,
    };
    let index = match level {
        Level::Beginner => 0,
        Level::Intermediate => 1,
        Level::Advanced => 2,
    };
    Some(tiers[index])
}

/// All topics of a subject, beginner first, tagged with their tier.
pub fn all_topics(subject: &str) -> Option<Vec<(&'static str, Level)>> {
    let mut flattened = Vec::new();
    for level in Level::ALL {
        let tier = topics(subject, level)?;
        flattened.extend(tier.iter().map(|topic| (*topic, level)));
    }
    Some(flattened)
}

/// Quiz question bank. Only beginner and intermediate tiers exist.
pub fn quiz_bank(subject: &str, level: Level) -> Option<&'static [&'static str]> {
    let bank: &'static [&'static str] = match (subject_key(subject).as_str(), level) {
        ("nlp", Level::Beginner) => &[
            "What is tokenization in NLP?",
            "What are stop words?",
            "Explain the difference between stemming and lemmatization",
            "What is TF-IDF?",
            "What is the bag of words model?",
        ],
        ("nlp", Level::Intermediate) => &[
            "How do word embeddings work?",
            "What is the difference between Word2Vec and GloVe?",
            "Explain sentiment analysis techniques",
            "What is Named Entity Recognition?",
            "How does part-of-speech tagging work?",
        ],
        ("python", Level::Beginner) => &[
            "What are the main data types in Python?",
            "How do you handle exceptions in Python?",
            "What is the difference between a list and a tuple?",
            "How do you read a file in Python?",
            "What is a function in Python?",
        ],
        ("python", Level::Intermediate) => &[
            "What is a decorator in Python?",
            "How do generators work?",
            "Explain object-oriented programming concepts",
            "What are lambda functions?",
            "How do you work with APIs in Python?",
        ],
        _ => return None,
    };
    Some(bank)
}

/// Coding challenges per tier.
pub fn coding_challenges(level: Level) -> &'static [&'static str] {
    match level {
        Level::Beginner => &[
            "Write a function to reverse a string",
            "Find the largest number in a list",
            "Check if a number is prime",
            "Count vowels in a string",
            "Calculate factorial recursively",
        ],
        Level::Intermediate => &[
            "Implement a binary search algorithm",
            "Find the longest palindromic substring",
            "Merge two sorted arrays",
            "Implement a stack using arrays",
            "Find duplicate elements in array",
        ],
        Level::Advanced => &[
            "Implement a LRU cache",
            "Find shortest path in a graph",
            "Design a rate limiter",
            "Implement a trie data structure",
            "Solve N-Queens problem",
        ],
    }
}

/// Suggested NLP project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProjectIdea {
    pub name: &'static str,
    pub description: &'static str,
    pub libraries: &'static [&'static str],
    pub difficulty: &'static str,
    pub estimated_time: &'static str,
}

const NLP_PROJECTS_BEGINNER: &[ProjectIdea] = &[
    ProjectIdea {
        name: "Sentiment Analysis Tool",
        description: "Build a tool to analyze sentiment in movie reviews",
        libraries: &["nltk", "sklearn"],
        difficulty: "Easy",
        estimated_time: "1-2 weeks",
    },
    ProjectIdea {
        name: "Text Summarizer",
        description: "Create an extractive text summarization tool",
        libraries: &["nltk", "sumy"],
        difficulty: "Easy-Medium",
        estimated_time: "1 week",
    },
];

const NLP_PROJECTS_INTERMEDIATE: &[ProjectIdea] = &[
    ProjectIdea {
        name: "Chatbot with Intent Recognition",
        description: "Build a chatbot that can understand user intents",
        libraries: &["spacy", "rasa"],
        difficulty: "Medium",
        estimated_time: "3-4 weeks",
    },
    ProjectIdea {
        name: "Named Entity Recognition System",
        description: "Train a custom NER model for specific domains",
        libraries: &["spacy", "transformers"],
        difficulty: "Medium",
        estimated_time: "2-3 weeks",
    },
];

const NLP_PROJECTS_ADVANCED: &[ProjectIdea] = &[
    ProjectIdea {
        name: "Question Answering System",
        description: "Build a BERT-based QA system",
        libraries: &["transformers", "pytorch"],
        difficulty: "Hard",
        estimated_time: "4-6 weeks",
    },
    ProjectIdea {
        name: "Text Generation with GPT",
        description: "Fine-tune GPT for domain-specific text generation",
        libraries: &["transformers", "pytorch"],
        difficulty: "Hard",
        estimated_time: "6-8 weeks",
    },
];

pub fn nlp_projects(level: Level) -> &'static [ProjectIdea] {
    match level {
        Level::Beginner => NLP_PROJECTS_BEGINNER,
        Level::Intermediate => NLP_PROJECTS_INTERMEDIATE,
        Level::Advanced => NLP_PROJECTS_ADVANCED,
    }
}

/// One phase of the NLP learning path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LearningPhase {
    pub title: &'static str,
    pub topics: &'static [&'static str],
    pub projects: &'static [&'static str],
    pub resources: &'static [&'static str],
}

pub const NLP_LEARNING_PATH: &[LearningPhase] = &[
    LearningPhase {
        title: "NLP Fundamentals (4-6 weeks)",
        topics: &[
            "Text preprocessing and cleaning",
            "Tokenization and normalization",
            "Feature extraction (BoW, TF-IDF)",
            "Basic text classification",
            "Sentiment analysis",
        ],
        projects: &["Movie review sentiment classifier"],
        resources: &["NLTK Book", "Python for NLP tutorials"],
    },
    LearningPhase {
        title: "Intermediate NLP (6-8 weeks)",
        topics: &[
            "Word embeddings (Word2Vec, GloVe)",
            "Named Entity Recognition",
            "Part-of-speech tagging",
            "Language modeling",
            "Topic modeling",
        ],
        projects: &["Custom NER system", "Topic modeling for documents"],
        resources: &["spaCy documentation", "Gensim tutorials"],
    },
    LearningPhase {
        title: "Advanced NLP (8-12 weeks)",
        topics: &[
            "Neural networks for NLP",
            "Attention mechanism",
            "Transformer architecture",
            "BERT and its variants",
            "Fine-tuning pre-trained models",
        ],
        projects: &["BERT-based text classifier", "Question answering system"],
        resources: &["Transformers library", "Papers on ArXiv"],
    },
];

#[cfg(test)]
mod tests {
    use super::{all_topics, quiz_bank, subject_key, topics};
    use crate::model::study::Level;

    #[test]
    fn subject_lookup_normalizes_case_and_spaces() {
        assert_eq!(subject_key(" Machine Learning "), "machine_learning");
        assert_eq!(topics("Python", Level::Beginner).map(<[_]>::len), Some(6));
        assert!(topics("rust", Level::Beginner).is_none());
    }

    #[test]
    fn all_topics_keeps_tier_order() {
        let flattened = all_topics("nlp").unwrap();
        assert_eq!(flattened.len(), 17);
        assert_eq!(flattened[0], ("Text preprocessing", Level::Beginner));
        assert_eq!(flattened[16].1, Level::Advanced);
    }

    #[test]
    fn quiz_bank_has_no_advanced_tier() {
        assert!(quiz_bank("nlp", Level::Advanced).is_none());
        assert!(quiz_bank("python", Level::Intermediate).is_some());
    }
}
