pub mod domain;
pub mod ports;

pub use domain::{
    Amenity, AssetRole, BrochureRecord, ContactInfo, GenerationRequest, GenerationResult,
    JobPhase, Layout, NewAccount, NewBrochureRecord, ParsedPromptInfo, ProfileUpdate, Session,
    TaskStatus, TrifoldOrder, UserProfile,
};
pub use ports::{
    AuthService, BrochureGenerationService, HistoryService, PortError, PortResult,
    PromptParsingService, SessionStore,
};
