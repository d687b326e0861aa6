//! Annotation registry: the fixed legacy -> target table.

use crate::annotation::AnnotationId;
use crate::rules::{MigrationRule, Transform};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Fully-qualified names of every annotation the registry knows about.
pub mod ids {
    use crate::annotation::AnnotationId;

    pub const SERENITY_WITH_TAG_VALUES_OF: AnnotationId =
        AnnotationId::from_static("net.thucydides.core.annotations.WithTagValuesOf");
    pub const SERENITY_TITLE: AnnotationId =
        AnnotationId::from_static("net.thucydides.core.annotations.Title");
    pub const SERENITY_ISSUE: AnnotationId =
        AnnotationId::from_static("net.thucydides.core.annotations.Issue");

    pub const ALLURE1_STEP: AnnotationId =
        AnnotationId::from_static("ru.yandex.qatools.allure.annotations.Step");
    pub const ALLURE1_STORIES: AnnotationId =
        AnnotationId::from_static("ru.yandex.qatools.allure.annotations.Stories");
    pub const ALLURE1_FEATURES: AnnotationId =
        AnnotationId::from_static("ru.yandex.qatools.allure.annotations.Features");

    pub const JUNIT5_TAGS: AnnotationId = AnnotationId::from_static("org.junit.jupiter.api.Tags");
    pub const JUNIT5_TAG: AnnotationId = AnnotationId::from_static("org.junit.jupiter.api.Tag");
    pub const JUNIT5_DISPLAY_NAME: AnnotationId =
        AnnotationId::from_static("org.junit.jupiter.api.DisplayName");

    pub const ALLURE2_TMS_LINK: AnnotationId = AnnotationId::from_static("io.qameta.allure.TmsLink");
    pub const ALLURE2_STEP: AnnotationId = AnnotationId::from_static("io.qameta.allure.Step");
    pub const ALLURE2_STORIES: AnnotationId = AnnotationId::from_static("io.qameta.allure.Stories");
    pub const ALLURE2_STORY: AnnotationId = AnnotationId::from_static("io.qameta.allure.Story");
    pub const ALLURE2_FEATURES: AnnotationId =
        AnnotationId::from_static("io.qameta.allure.Features");
    pub const ALLURE2_FEATURE: AnnotationId = AnnotationId::from_static("io.qameta.allure.Feature");
}

/// Which group of migrations to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Profile {
    /// Serenity -> JUnit5 (tags, title) and Serenity issue -> Allure2 TMS link.
    Junit5,
    /// Allure1 -> Allure2 (stories, features, steps).
    Allure,
    #[default]
    All,
}

impl Profile {
    fn includes(self, group: Profile) -> bool {
        self == Profile::All || self == group
    }
}

impl FromStr for Profile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "junit5" | "junit" | "serenity" => Ok(Self::Junit5),
            "allure" | "allure2" => Ok(Self::Allure),
            "all" => Ok(Self::All),
            other => Err(format!("unknown profile '{other}' (expected junit5, allure or all)")),
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Profile::Junit5 => "junit5",
            Profile::Allure => "allure",
            Profile::All => "all",
        })
    }
}

/// How generated annotations spell their type names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameStyle {
    /// `@Tag("a")`, relying on an import.
    #[default]
    Short,
    /// `@org.junit.jupiter.api.Tag("a")`.
    Qualified,
}

impl NameStyle {
    pub fn name_of(self, id: &AnnotationId) -> &str {
        match self {
            NameStyle::Short => id.simple_name(),
            NameStyle::Qualified => id.as_str(),
        }
    }
}

impl FromStr for NameStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "short" | "simple" => Ok(Self::Short),
            "qualified" | "fqn" => Ok(Self::Qualified),
            other => Err(format!("unknown name style '{other}' (expected short or qualified)")),
        }
    }
}

struct Entry {
    legacy: AnnotationId,
    target: AnnotationId,
    transform: Transform,
    group: Profile,
}

const TABLE: &[Entry] = &[
    Entry {
        legacy: ids::SERENITY_WITH_TAG_VALUES_OF,
        target: ids::JUNIT5_TAGS,
        transform: Transform::ArrayRewrap {
            inner: ids::JUNIT5_TAG,
        },
        group: Profile::Junit5,
    },
    Entry {
        legacy: ids::SERENITY_TITLE,
        target: ids::JUNIT5_DISPLAY_NAME,
        transform: Transform::Passthrough,
        group: Profile::Junit5,
    },
    Entry {
        legacy: ids::SERENITY_ISSUE,
        target: ids::ALLURE2_TMS_LINK,
        transform: Transform::Passthrough,
        group: Profile::Junit5,
    },
    Entry {
        legacy: ids::ALLURE1_STORIES,
        target: ids::ALLURE2_STORIES,
        transform: Transform::ArrayRewrap {
            inner: ids::ALLURE2_STORY,
        },
        group: Profile::Allure,
    },
    Entry {
        legacy: ids::ALLURE1_FEATURES,
        target: ids::ALLURE2_FEATURES,
        transform: Transform::ArrayRewrap {
            inner: ids::ALLURE2_FEATURE,
        },
        group: Profile::Allure,
    },
    Entry {
        legacy: ids::ALLURE1_STEP,
        target: ids::ALLURE2_STEP,
        transform: Transform::StepPlaceholders,
        group: Profile::Allure,
    },
];

/// Lookup table from legacy annotation ids to their rules.
#[derive(Debug, Clone)]
pub struct Registry {
    rules: Vec<MigrationRule>,
    style: NameStyle,
}

impl Registry {
    pub fn new(profile: Profile, style: NameStyle) -> Self {
        let rules = TABLE
            .iter()
            .filter(|entry| profile.includes(entry.group))
            .map(|entry| MigrationRule {
                legacy: entry.legacy.clone(),
                target: entry.target.clone(),
                transform: entry.transform.clone(),
                style,
            })
            .collect();
        Self { rules, style }
    }

    /// Every rule, short names.
    pub fn builtin() -> Self {
        Self::new(Profile::All, NameStyle::Short)
    }

    /// The same rules, rendering names in `style`.
    pub fn with_style(&self, style: NameStyle) -> Self {
        let rules = self
            .rules
            .iter()
            .cloned()
            .map(|rule| MigrationRule { style, ..rule })
            .collect();
        Self { rules, style }
    }

    pub fn lookup(&self, id: &AnnotationId) -> Option<&MigrationRule> {
        self.rules.iter().find(|rule| &rule.legacy == id)
    }

    pub fn legacy_ids(&self) -> impl Iterator<Item = &AnnotationId> {
        self.rules.iter().map(|rule| &rule.legacy)
    }

    /// Every id a rule can emit, outer and inner.
    pub fn target_ids(&self) -> impl Iterator<Item = &AnnotationId> {
        self.rules.iter().flat_map(|rule| {
            let inner = match &rule.transform {
                Transform::ArrayRewrap { inner } => Some(inner),
                _ => None,
            };
            std::iter::once(&rule.target).chain(inner)
        })
    }

    pub fn rules(&self) -> &[MigrationRule] {
        &self.rules
    }

    pub fn style(&self) -> NameStyle {
        self.style
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_covers_every_pair() {
        let registry = Registry::builtin();
        assert_eq!(registry.rules().len(), 6);
        for (legacy, target) in [
            (ids::SERENITY_WITH_TAG_VALUES_OF, ids::JUNIT5_TAGS),
            (ids::SERENITY_TITLE, ids::JUNIT5_DISPLAY_NAME),
            (ids::SERENITY_ISSUE, ids::ALLURE2_TMS_LINK),
            (ids::ALLURE1_STORIES, ids::ALLURE2_STORIES),
            (ids::ALLURE1_FEATURES, ids::ALLURE2_FEATURES),
            (ids::ALLURE1_STEP, ids::ALLURE2_STEP),
        ] {
            let rule = registry.lookup(&legacy).unwrap();
            assert_eq!(rule.target, target);
        }
    }

    #[test]
    fn test_target_ids_are_not_legacy() {
        let registry = Registry::builtin();
        for target in registry.target_ids() {
            assert!(registry.lookup(target).is_none(), "{target} would be migrated twice");
        }
    }

    #[test]
    fn test_unknown_id_is_none() {
        let registry = Registry::builtin();
        assert!(registry
            .lookup(&AnnotationId::new("org.junit.jupiter.api.Test"))
            .is_none());
    }

    #[test]
    fn test_profiles_partition_the_table() {
        let junit = Registry::new(Profile::Junit5, NameStyle::Short);
        let allure = Registry::new(Profile::Allure, NameStyle::Short);
        assert_eq!(junit.rules().len(), 3);
        assert_eq!(allure.rules().len(), 3);
        assert!(junit.lookup(&ids::ALLURE1_STEP).is_none());
        assert!(allure.lookup(&ids::SERENITY_TITLE).is_none());
    }

    #[test]
    fn test_profile_and_style_parse() {
        assert_eq!("JUnit5".parse::<Profile>().unwrap(), Profile::Junit5);
        assert_eq!("allure".parse::<Profile>().unwrap(), Profile::Allure);
        assert!("testng".parse::<Profile>().is_err());
        assert_eq!("fqn".parse::<NameStyle>().unwrap(), NameStyle::Qualified);
    }

    #[test]
    fn test_style_is_carried_into_rules() {
        let registry = Registry::new(Profile::All, NameStyle::Qualified);
        assert_eq!(registry.style(), NameStyle::Qualified);
        assert!(registry
            .rules()
            .iter()
            .all(|rule| rule.style == NameStyle::Qualified));
    }

    #[test]
    fn test_with_style_keeps_profile() {
        let short = Registry::new(Profile::Allure, NameStyle::Short);
        let qualified = short.with_style(NameStyle::Qualified);
        assert_eq!(qualified.style(), NameStyle::Qualified);
        assert_eq!(qualified.rules().len(), short.rules().len());
        assert!(qualified.lookup(&ids::SERENITY_TITLE).is_none());
        assert_eq!(
            qualified.lookup(&ids::ALLURE1_STEP).map(|rule| rule.style),
            Some(NameStyle::Qualified)
        );
    }
}
