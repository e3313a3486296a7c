pub mod comparer;
pub mod encoding;
pub mod engine;
pub mod recognizer;
pub mod store;

pub use comparer::{cosine_similarity, euclidean_distance};

pub use encoding::{validate_principal_id, FaceEncoding};

pub use engine::{
    AuthDecision, AuthenticationEngine, AuthenticationOutcome, DEFAULT_SIMILARITY_THRESHOLD,
};

pub use recognizer::{RegistryRecognizer, DEFAULT_RECOGNITION_TOLERANCE};

pub use store::{
    EncodingStore, EnrollmentRecord, EnvStoreDirResolver, FilesystemEncodingStore,
    InMemoryEncodingStore, StoreDirResolver,
};
