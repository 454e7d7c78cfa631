//! Rig Authoring Tools
//!
//! Editing commands that run against a [`rigkit_core::Scene`]:
//! - Constraints: IK, stretch-to, locked-track and track-to with target inference
//! - Placement: joint magnets, face and chain alignment, straightening
//! - Naming and auditing: chain rename and the bone doctor report
//! - Assembly: armature creation, joint insertion, mesh parenting, vertex picking
//! - Shape-key drivers wired to widget joints
//!
//! The [`registry`] describes every command, [`panel`] decides which ones a
//! host shows, and [`actions`] dispatches queued [`RigAction`]s against the
//! shared [`RigState`].

pub mod actions;
pub mod commands;
pub mod config;
pub mod context;
pub mod panel;
pub mod registry;
pub mod report;
pub mod state;

#[cfg(test)]
mod test_fixtures;

pub use actions::{ActionContext, dispatch_action, process_pending_actions};
pub use config::{ConfigError, ConfigManager, SharedConfig, ToolConfig, create_shared_config};
pub use context::{ContextSnapshot, MeshParenting};
pub use panel::{PanelSection, PanelState, PoseSelection, panel_sections};
pub use registry::{CommandDescriptor, ParamKind, ParamSpec, find_command};
pub use report::{CommandError, CommandOutcome, Report, ReportLevel};
pub use state::{Dialog, RigAction, RigState, SharedRigState, create_shared_state};

/// Install the tracing subscriber used by hosts embedding the tools
///
/// `RUST_LOG` overrides the default filter. Calling it twice is harmless.
pub fn init_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rigkit_tools=debug,rigkit_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
