use crate::domain::signals::{ClientCategory, RequestSignals};
use crate::domain::tokens::{
    APP_NAME_TOKENS, MOBILE_PLATFORM_TOKENS, REQUESTED_WITH_PACKAGES, contains_any, match_table,
};
use std::fmt;

/// Which rule produced a classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    Override,
    RequestedWith,
    UserAgent,
    Referer,
    ScannerHint,
    MobilePlatform,
    NoSignals,
    Default,
}

impl RuleKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Override => "override",
            Self::RequestedWith => "requested_with",
            Self::UserAgent => "user_agent",
            Self::Referer => "referer",
            Self::ScannerHint => "scanner_hint",
            Self::MobilePlatform => "mobile_platform",
            Self::NoSignals => "no_signals",
            Self::Default => "default",
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub category: ClientCategory,
    pub rule: RuleKind,
}

type Evaluate = fn(&RequestSignals) -> Option<ClientCategory>;

struct Rule {
    kind: RuleKind,
    evaluate: Evaluate,
}

/// App-identifying rules come first, most trustworthy first. The trailing
/// rules only pick among the non-app categories, with `Browser` as the
/// catch-all. `Unknown` is kept for requests that carry no header text at all,
/// so decisions keep an empty request distinct from a desktop browser.
const RULES: &[Rule] = &[
    Rule {
        kind: RuleKind::Override,
        evaluate: |s| {
            s.explicit_app_override
                .as_deref()
                .and_then(ClientCategory::from_override)
        },
    },
    Rule {
        kind: RuleKind::RequestedWith,
        evaluate: |s| match_table(&s.requested_with, REQUESTED_WITH_PACKAGES),
    },
    Rule {
        kind: RuleKind::UserAgent,
        evaluate: |s| match_table(&s.user_agent, APP_NAME_TOKENS),
    },
    Rule {
        kind: RuleKind::Referer,
        evaluate: |s| match_table(&s.referer, APP_NAME_TOKENS),
    },
    Rule {
        kind: RuleKind::MobilePlatform,
        evaluate: |s| {
            contains_any(&s.user_agent, MOBILE_PLATFORM_TOKENS)
                .then_some(ClientCategory::MobileBrowser)
        },
    },
    Rule {
        kind: RuleKind::ScannerHint,
        evaluate: |s| s.scanner_hint.then_some(ClientCategory::Camera),
    },
    Rule {
        kind: RuleKind::NoSignals,
        evaluate: |s| s.is_blank().then_some(ClientCategory::Unknown),
    },
    Rule {
        kind: RuleKind::Default,
        evaluate: |_| Some(ClientCategory::Browser),
    },
];

/// Infers the client category of a request from its signals.
///
/// Evaluation is first-match-wins over a fixed rule list, so a confident
/// early match can never be overwritten by a weaker later signal.
#[derive(Debug, Clone, Copy, Default)]
pub struct AppClassifier;

impl AppClassifier {
    pub fn new() -> Self {
        Self
    }

    pub fn classify(&self, signals: &RequestSignals) -> ClientCategory {
        self.classify_with_rule(signals).category
    }

    pub fn classify_with_rule(&self, signals: &RequestSignals) -> Classification {
        let classification = RULES
            .iter()
            .find_map(|rule| {
                (rule.evaluate)(signals).map(|category| Classification {
                    category,
                    rule: rule.kind,
                })
            })
            .unwrap_or(Classification {
                category: ClientCategory::Browser,
                rule: RuleKind::Default,
            });

        tracing::debug!(
            category = %classification.category,
            rule = %classification.rule,
            "classified request"
        );
        classification
    }
}
