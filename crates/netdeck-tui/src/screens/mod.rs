//! Screen implementations. Each screen is a top-level Component.

pub mod dashboard;
pub mod policies;
pub mod security;
pub mod sla;
pub mod topology;

use crate::component::Component;
use crate::screen::ScreenId;

/// Create screen components for the tab bar.
pub fn create_screens() -> Vec<(ScreenId, Box<dyn Component>)> {
    vec![
        (
            ScreenId::Dashboard,
            Box::new(dashboard::DashboardScreen::new()),
        ),
        (
            ScreenId::Topology,
            Box::new(topology::TopologyScreen::new()),
        ),
        (
            ScreenId::Policies,
            Box::new(policies::PoliciesScreen::new()),
        ),
        (ScreenId::Sla, Box::new(sla::SlaScreen::new())),
        (
            ScreenId::Security,
            Box::new(security::SecurityScreen::new()),
        ),
    ]
}
