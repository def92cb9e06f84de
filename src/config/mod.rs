pub mod schema;

pub use schema::{
    AgeGateConfig, ArtifactsConfig, BrowserConfig, Config, ContentConfig, TargetConfig, Viewport,
};
