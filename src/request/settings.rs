use std::time::Duration;

/// One named, independently defaulted piece of request configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facet {
    Agent,
    Referer,
    Redirect,
    Ssl,
    Cookie,
}

/// The fixed order facets are resolved in before dispatch. No facet depends
/// on another's value, but options must accumulate in a deterministic
/// sequence so the assembled request is reproducible.
pub(crate) const FACET_ORDER: [Facet; 5] = [
    Facet::Agent,
    Facet::Referer,
    Facet::Redirect,
    Facet::Ssl,
    Facet::Cookie,
];

/// Who configured a facet. Defaults only run for `Unset` facets, and a facet
/// is applied at most once per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacetState {
    Unset,
    CallerConfigured,
    DefaultApplied,
}

/// The values behind every facet, plus the timeout and diagnostics settings
/// applied to each dispatch.
#[derive(Debug, Clone)]
pub(crate) struct FacetSettings {
    states: [FacetState; 5],
    pub agent: Option<String>,
    pub referer: Option<String>,
    pub follow_redirects: bool,
    pub max_redirects: u32,
    pub verify_tls: bool,
    pub ca_path: Option<String>,
    pub cookies: Vec<(String, String)>,
    pub connect_timeout: Duration,
    pub timeout: Duration,
    pub verbose: bool,
}

impl Default for FacetSettings {
    fn default() -> FacetSettings {
        FacetSettings {
            states: [FacetState::Unset; 5],
            agent: None,
            referer: None,
            follow_redirects: true,
            max_redirects: 5,
            verify_tls: false,
            ca_path: None,
            cookies: Vec::new(),
            connect_timeout: Duration::from_secs(1),
            timeout: Duration::from_secs(30),
            verbose: false,
        }
    }
}

impl FacetSettings {
    pub fn state(&self, facet: Facet) -> FacetState {
        self.states[facet as usize]
    }

    /// Record that the caller configured this facet explicitly. The default
    /// path must not run for it afterwards.
    pub fn mark_configured(&mut self, facet: Facet) {
        self.states[facet as usize] = FacetState::CallerConfigured;
    }

    /// Record that the default path ran for this facet. A facet the caller
    /// already configured keeps its `CallerConfigured` state.
    pub fn mark_defaulted(&mut self, facet: Facet) {
        if self.states[facet as usize] == FacetState::Unset {
            self.states[facet as usize] = FacetState::DefaultApplied;
        }
    }
}
