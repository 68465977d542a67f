use crate::rules::RulesFile;

/// The first rule tier that admits a title.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassificationTier {
    Exact,
    Any,
    None,
}

impl ClassificationTier {
    pub fn is_eligible(self) -> bool {
        self != ClassificationTier::None
    }
}

/// Rules are expected lowercase, titles are lowercased here.
pub fn classify(title: &str, rules: &RulesFile) -> ClassificationTier {
    let title = title.to_lowercase();

    if rules.exact_matches.iter().any(|exact| *exact == title) {
        return ClassificationTier::Exact;
    }

    let any = rules.any_matches.iter().any(|part| title.contains(part.as_str()));
    let excluded = rules.no_matches.iter().any(|part| title.contains(part.as_str()));
    if any && !excluded {
        return ClassificationTier::Any;
    }

    ClassificationTier::None
}

#[inline]
pub fn is_eligible(title: &str, rules: &RulesFile) -> bool {
    classify(title, rules).is_eligible()
}
