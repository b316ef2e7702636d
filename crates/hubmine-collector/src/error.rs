//! Error types for section collection.

use hubmine_github::ApiError;
use std::fmt;
use thiserror::Error;

/// The enrichment sections of an entity record, in collection order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    /// `extended_user_data`
    ExtendedProfile,
    /// `development_patterns`
    DevelopmentPatterns,
    /// `commit_activity`
    CommitActivity,
    /// `social_network`
    SocialNetwork,
    /// `repository_portfolio`
    RepositoryPortfolio,
    /// `contribution_quality`
    ContributionQuality,
}

impl Section {
    /// Every section in collection order.
    pub const ORDER: [Section; 6] = [
        Section::ExtendedProfile,
        Section::DevelopmentPatterns,
        Section::CommitActivity,
        Section::SocialNetwork,
        Section::RepositoryPortfolio,
        Section::ContributionQuality,
    ];

    /// Key of the section in the exported record.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::ExtendedProfile => "extended_user_data",
            Self::DevelopmentPatterns => "development_patterns",
            Self::CommitActivity => "commit_activity",
            Self::SocialNetwork => "social_network",
            Self::RepositoryPortfolio => "repository_portfolio",
            Self::ContributionQuality => "contribution_quality",
        }
    }

    /// Whether the section is computed from the repository listing.
    #[must_use]
    pub fn needs_repositories(self) -> bool {
        !matches!(self, Self::ExtendedProfile | Self::SocialNetwork)
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A section could not be collected; the record keeps its default shape.
#[derive(Error, Debug)]
pub enum SectionError {
    /// An upstream call the section cannot do without failed
    #[error("{section} failed: {source}")]
    Upstream {
        /// Affected section
        section: Section,
        /// Underlying API error
        #[source]
        source: ApiError,
    },

    /// The repository listing failed earlier in the entity's collection
    #[error("{section} skipped: repository listing unavailable")]
    RepositoriesUnavailable {
        /// Affected section
        section: Section,
    },
}

impl SectionError {
    /// Wrap an API error for `section`.
    #[must_use]
    pub fn upstream(section: Section, source: ApiError) -> Self {
        Self::Upstream { section, source }
    }

    /// The section that failed.
    #[must_use]
    pub fn section(&self) -> Section {
        match self {
            Self::Upstream { section, .. } | Self::RepositoriesUnavailable { section } => *section,
        }
    }
}

/// Result type alias for section collection.
pub type Result<T> = std::result::Result<T, SectionError>;
