pub const DEFAULT_SID: &str = "S1";
pub const DEFAULT_FRAME_CAP: usize = 1_048_576;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostConfig {
    pub sid: String,
    pub frame_cap: usize,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            sid: DEFAULT_SID.to_string(),
            frame_cap: DEFAULT_FRAME_CAP,
        }
    }
}

impl HostConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads `RENDER_HOST_SID` and `RENDER_HOST_FRAME_CAP`; empty, invalid or
    /// zero values fall back to the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let sid = lookup("RENDER_HOST_SID")
            .filter(|sid| !sid.is_empty())
            .unwrap_or_else(|| DEFAULT_SID.to_string());
        let frame_cap = lookup("RENDER_HOST_FRAME_CAP")
            .and_then(|raw| raw.trim().parse::<usize>().ok())
            .filter(|cap| *cap > 0)
            .unwrap_or(DEFAULT_FRAME_CAP);

        Self { sid, frame_cap }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> HostConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        HostConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_without_environment() {
        assert_eq!(config(&[]), HostConfig::default());
    }

    #[test]
    fn environment_overrides_are_read() {
        let config = config(&[("RENDER_HOST_SID", "S9"), ("RENDER_HOST_FRAME_CAP", " 4096 ")]);
        assert_eq!(config.sid, "S9");
        assert_eq!(config.frame_cap, 4096);
    }

    #[test]
    fn unusable_frame_caps_are_ignored() {
        for raw in ["0", "-5", "lots"] {
            assert_eq!(
                config(&[("RENDER_HOST_FRAME_CAP", raw)]).frame_cap,
                DEFAULT_FRAME_CAP
            );
        }
    }
}
