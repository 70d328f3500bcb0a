/// What the probe should fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeTarget {
    /// Any path, printed as raw JSON
    Raw(String),
    Coupons { page: u32 },
    Users { page: u32 },
}

/// Parsed command-line arguments of `dash_probe`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeArgs {
    pub target: ProbeTarget,
    pub config: Option<String>,
}

impl ProbeArgs {
    /// Parses the process arguments, skipping the program name
    pub fn from_env_args() -> Self {
        Self::parse(std::env::args().skip(1))
    }

    /// Usage: `[--config FILE] [coupons [PAGE] | users [PAGE] | PATH]`
    pub fn parse<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut config = None;
        let mut positional = Vec::new();
        let mut args = args.into_iter().map(Into::into);

        while let Some(arg) = args.next() {
            if arg == "--config" {
                config = args.next();
            } else if let Some(path) = arg.strip_prefix("--config=") {
                config = Some(path.to_string());
            } else {
                positional.push(arg);
            }
        }

        let page = |index: usize| positional.get(index).and_then(|p| p.parse::<u32>().ok()).unwrap_or(1);
        let target = match positional.first().map(String::as_str) {
            Some("coupons") => ProbeTarget::Coupons { page: page(1) },
            Some("users") => ProbeTarget::Users { page: page(1) },
            Some(path) => ProbeTarget::Raw(path.to_string()),
            None => ProbeTarget::Raw("/".to_string()),
        };

        Self { target, config }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = ProbeArgs::parse(Vec::<String>::new());
        assert_eq!(args, ProbeArgs { target: ProbeTarget::Raw("/".into()), config: None });
    }

    #[test]
    fn test_resources() {
        assert_eq!(ProbeArgs::parse(["coupons", "3"]).target, ProbeTarget::Coupons { page: 3 });
        assert_eq!(ProbeArgs::parse(["users"]).target, ProbeTarget::Users { page: 1 });
        assert_eq!(ProbeArgs::parse(["users", "x"]).target, ProbeTarget::Users { page: 1 });
    }

    #[test]
    fn test_config_flag() {
        let args = ProbeArgs::parse(["--config", "dash.toml", "/settings"]);
        assert_eq!(args.config.as_deref(), Some("dash.toml"));
        assert_eq!(args.target, ProbeTarget::Raw("/settings".into()));

        let args = ProbeArgs::parse(["/health", "--config=prod.toml"]);
        assert_eq!(args.config.as_deref(), Some("prod.toml"));
    }
}
