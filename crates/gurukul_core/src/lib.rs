pub mod catalog;
pub mod chat;
pub mod domain;
pub mod ports;
pub mod progress;
pub mod recommend;

pub use catalog::{CatalogError, LessonCatalog};
pub use chat::{ChatPhase, ChatTranscript, OutboundTurn, SendRejection};
pub use domain::{
    Board, BoardScope, ChatMessage, ChatRole, ChatTurn, DownloadSet, LearnerProfile,
    LessonRecord, QuizQuestion, Subject,
};
pub use ports::{PortError, PortResult, ProfileStore, ProgressAnalysisService, SpeechService,
    TutorService};
pub use recommend::{GradeFilter, LibraryFilter, SubjectFilter};
