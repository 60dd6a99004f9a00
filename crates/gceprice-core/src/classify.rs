//! SKU description → machine / accelerator family.
//!
//! The catalog only names the family inside free text, so this is an ordered
//! list of rules evaluated first-match-wins. Later rules are more generic and
//! would mis-capture the special cases above them; append new formats at the
//! position where they stop shadowing each other.

use regex::Regex;
use std::sync::LazyLock;

/// Family token of the flagship accelerator that gets its own SKUs, including
/// DWS-prefixed ones the anchored GPU rule cannot see.
pub const FLAGSHIP_ACCELERATOR: &str = "H100 80GB Mega";

enum Test {
    Group(&'static str),
    Fragment(&'static str),
    Pattern(Regex),
}

enum Extract {
    Fixed(&'static str),
    Capture,
    CaptureUpper,
}

struct Rule {
    name: &'static str,
    test: Test,
    extract: Extract,
}

impl Rule {
    fn group(name: &'static str, group: &'static str, family: &'static str) -> Self {
        Rule { name, test: Test::Group(group), extract: Extract::Fixed(family) }
    }

    fn fragment(name: &'static str, fragment: &'static str, family: &'static str) -> Self {
        Rule { name, test: Test::Fragment(fragment), extract: Extract::Fixed(family) }
    }

    fn pattern(name: &'static str, pattern: &str, extract: Extract) -> Self {
        let re = Regex::new(pattern).expect("classifier pattern must compile");
        Rule { name, test: Test::Pattern(re), extract }
    }

    fn apply(&self, resource_group: &str, description: &str) -> Option<String> {
        let caps = match &self.test {
            Test::Group(g) => (*g == resource_group).then_some(None)?,
            Test::Fragment(f) => description.contains(f).then_some(None)?,
            Test::Pattern(re) => Some(re.captures(description)?),
        };
        match self.extract {
            Extract::Fixed(family) => Some(family.to_string()),
            Extract::Capture => caps?.get(1).map(|m| m.as_str().to_string()),
            Extract::CaptureUpper => caps?.get(1).map(|m| m.as_str().to_uppercase()),
        }
    }
}

static RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    vec![
        Rule::group("n1-standard-group", "N1Standard", "N1"),
        Rule::group("f1-micro-group", "F1Micro", "F1"),
        Rule::group("g1-small-group", "G1Small", "G1"),
        Rule::fragment("flagship-accelerator", FLAGSHIP_ACCELERATOR, FLAGSHIP_ACCELERATOR),
        Rule::pattern(
            "gpu",
            r"^(?:Commitment v\d+:\s+)?(?:Spot Preemptible\s+)?(?:(?i:nvidia)\s+|AMD\s+)?(.+?)\s+GPU\b",
            Extract::Capture,
        ),
        Rule::pattern(
            "compute-optimized",
            r"^(?:Commitment v\d+:\s+)?(?:Spot Preemptible\s+)?Compute\s+optimized",
            Extract::Fixed("C2"),
        ),
        Rule::pattern(
            "custom-instance",
            r"^(?:Spot Preemptible\s+)?Custom\s+(?:Extended\s+)?Instance",
            Extract::Fixed("N1"),
        ),
        Rule::pattern(
            "commitment-core",
            r"^Commitment v\d+:\s+(?:Cpu|Ram)\s+in\b",
            Extract::Fixed("N1"),
        ),
        Rule::pattern(
            "memory-optimized",
            r"^(?:Commitment v\d+:\s+)?(?:Spot Preemptible\s+)?Memory-optimized",
            Extract::Fixed("M1"),
        ),
        Rule::pattern(
            "instance",
            r"^(?:Spot Preemptible\s+)?([^\s]+?)\s+(?:AMD\s+)?(?:Memory-optimized\s+)?(?:Arm\s+)?(?:Custom\s+)?(?:Extended\s+)?(?:Instance|Ram)",
            Extract::CaptureUpper,
        ),
        Rule::pattern("commitment", r"^Commitment[^:]*:\s+(\S+)\s", Extract::CaptureUpper),
    ]
});

/// Classify a SKU into its family, or `None` when no rule matches.
pub fn classify(resource_group: &str, description: &str) -> Option<String> {
    classify_with_rule(resource_group, description).map(|(_, family)| family)
}

/// Like [`classify`], also naming the rule that matched.
pub fn classify_with_rule(resource_group: &str, description: &str) -> Option<(&'static str, String)> {
    RULES
        .iter()
        .find_map(|rule| rule.apply(resource_group, description).map(|f| (rule.name, f)))
}
