//! Editing session state

mod dialog;

pub use dialog::Dialog;

use std::sync::Arc;

use parking_lot::Mutex;
use rigkit_core::Scene;

use crate::commands::assembly::{AddJointParams, CreateArmatureParams, NearestParentParams};
use crate::commands::chain_align::ChainAlignParams;
use crate::commands::doctor::DoctorParams;
use crate::commands::driver::DriverParams;
use crate::commands::face_align::FaceAlignParams;
use crate::commands::rename::ChainRenameParams;
use crate::commands::straighten::StraightenParams;
use crate::config::{SharedConfig, ToolConfig};
use crate::context::ContextSnapshot;
use crate::panel::PanelState;
use crate::report::Report;

/// Actions that can be performed on the session
#[derive(Debug, Clone)]
pub enum RigAction {
    // Dialog actions
    /// Run a command's invoke step and keep its dialog open
    Invoke(&'static str),
    /// Confirm an open dialog
    Execute(Dialog),
    /// Dismiss an open dialog
    Cancel(Dialog),

    // Skeleton actions
    ChainRename(ChainRenameParams),
    AlignToFace(FaceAlignParams),
    AlignChain(ChainAlignParams),
    Straighten(StraightenParams),
    Doctor(DoctorParams),
    CreateDriver(DriverParams),

    // Mesh actions
    CreateArmature(CreateArmatureParams),
    AddJointAtSelection(AddJointParams),
    ParentMeshesToNearest(NearestParentParams),
}

/// Session state shared between the host and the dispatcher
pub struct RigState {
    pub scene: Scene,
    pub config: ToolConfig,
    /// Dialog waiting for the user
    pub open_dialog: Option<Dialog>,
    /// Messages shown to the user, oldest first
    pub reports: Vec<Report>,
    pending_actions: Vec<RigAction>,
}

impl Default for RigState {
    fn default() -> Self {
        Self::new(Scene::default(), ToolConfig::default())
    }
}

impl RigState {
    pub fn new(scene: Scene, config: ToolConfig) -> Self {
        Self {
            scene,
            config,
            open_dialog: None,
            reports: Vec::new(),
            pending_actions: Vec::new(),
        }
    }

    /// Start a session on the current contents of a shared configuration
    pub fn with_shared_config(scene: Scene, config: &SharedConfig) -> Self {
        Self::new(scene, config.read().config().clone())
    }

    /// Pick up configuration edits made through the shared manager
    pub fn reload_config(&mut self, config: &SharedConfig) {
        self.config = config.read().config().clone();
        tracing::debug!("Reloaded tool configuration");
    }

    /// Queue an action
    pub fn queue_action(&mut self, action: RigAction) {
        self.pending_actions.push(action);
    }

    /// Take pending actions
    pub fn take_pending_actions(&mut self) -> Vec<RigAction> {
        std::mem::take(&mut self.pending_actions)
    }

    pub fn take_reports(&mut self) -> Vec<Report> {
        std::mem::take(&mut self.reports)
    }

    pub fn context(&self) -> ContextSnapshot {
        ContextSnapshot::capture(&self.scene)
    }

    pub fn panel_state(&self) -> PanelState {
        PanelState::from_context(&self.context())
    }
}

pub type SharedRigState = Arc<Mutex<RigState>>;

pub fn create_shared_state(state: RigState) -> SharedRigState {
    Arc::new(Mutex::new(state))
}
