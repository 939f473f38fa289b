//! Screen identifier enum — navigable by number keys.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScreenId {
    #[default]
    Dashboard, // 1
    Topology, // 2
    Policies, // 3
    Sla,      // 4
    Security, // 5
}

impl ScreenId {
    /// All screens in tab-bar order.
    pub const ALL: [ScreenId; 5] = [
        Self::Dashboard,
        Self::Topology,
        Self::Policies,
        Self::Sla,
        Self::Security,
    ];

    /// Numeric key (1-5) for this screen.
    pub fn number(self) -> u8 {
        match self {
            Self::Dashboard => 1,
            Self::Topology => 2,
            Self::Policies => 3,
            Self::Sla => 4,
            Self::Security => 5,
        }
    }

    /// Screen from a numeric key (1-5). Returns None for out-of-range.
    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(Self::Dashboard),
            2 => Some(Self::Topology),
            3 => Some(Self::Policies),
            4 => Some(Self::Sla),
            5 => Some(Self::Security),
            _ => None,
        }
    }

    /// Next screen in tab order (wraps around).
    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|&s| s == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    /// Previous screen in tab order (wraps around).
    pub fn prev(self) -> Self {
        let idx = Self::ALL.iter().position(|&s| s == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    /// Short label for the tab bar.
    pub fn label(self) -> &'static str {
        match self {
            Self::Dashboard => "Dashboard",
            Self::Topology => "Topology",
            Self::Policies => "Policies",
            Self::Sla => "SLA",
            Self::Security => "Security",
        }
    }
}

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_keys_and_tab_cycling_agree() {
        for screen in ScreenId::ALL {
            assert_eq!(ScreenId::from_number(screen.number()), Some(screen));
        }
        assert_eq!(ScreenId::from_number(0), None);
        assert_eq!(ScreenId::from_number(6), None);

        let mut current = ScreenId::Dashboard;
        for _ in 0..ScreenId::ALL.len() {
            current = current.next();
        }
        assert_eq!(current, ScreenId::Dashboard);
        assert_eq!(ScreenId::Dashboard.prev(), ScreenId::Security);
    }
}
