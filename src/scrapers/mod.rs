//! Site sources for AI news, blog and paper listings.
//!
//! Each submodule describes one site as a [`Source`]. Sites that follow the common
//! "static listing, one page per article" shape are plain [`static_site::StaticSite`] values;
//! the others implement [`Source`] directly.
//!
//! # Supported Sources
//!
//! | Source | Module | Listing | Body |
//! |--------|--------|---------|------|
//! | AI Weekly | [`aiweekly`] | newest issue's category sections | generic extractor, short links resolved |
//! | Hugging Face blog | [`hf_blog`] | blog index cards | article or markdown container |
//! | Hugging Face papers | [`hf_papers`] | trending papers page | abstract, embedded JSON, "Abstract" heading |
//! | TechCrunch AI | [`techcrunch`] | AI category page | article content containers |
//! | 量子位 | [`qbitai`] | home page post titles | entry content, all text nodes |
//! | Synced Review | [`synced`] | home page post titles | entry content, all text nodes |
//! | 机器之心 | [`jiqizhixin`] | paginated JSON API | detail API body |
//! | 新智元 | [`ai_era`] | Mastodon-style timeline | linked hub article, post text fallback |

pub mod ai_era;
pub mod aiweekly;
pub mod hf_blog;
pub mod hf_papers;
pub mod jiqizhixin;
pub mod qbitai;
pub mod static_site;
pub mod synced;
pub mod techcrunch;

use clap::ValueEnum;

use crate::crawl::Source;

/// Source selectable on the command line.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceName {
    AiWeekly,
    HfBlog,
    HfPapers,
    Techcrunch,
    Qbitai,
    Synced,
    Jiqizhixin,
    AiEra,
}

impl SourceName {
    pub fn as_str(self) -> &'static str {
        match self {
            SourceName::AiWeekly => "ai-weekly",
            SourceName::HfBlog => "hf-blog",
            SourceName::HfPapers => "hf-papers",
            SourceName::Techcrunch => "techcrunch",
            SourceName::Qbitai => "qbitai",
            SourceName::Synced => "synced",
            SourceName::Jiqizhixin => "jiqizhixin",
            SourceName::AiEra => "ai-era",
        }
    }

    /// Build the source with its production base URL.
    pub fn build(self) -> Box<dyn Source> {
        match self {
            SourceName::AiWeekly => Box::new(aiweekly::AiWeekly::new()),
            SourceName::HfBlog => Box::new(hf_blog::site()),
            SourceName::HfPapers => Box::new(hf_papers::site()),
            SourceName::Techcrunch => Box::new(techcrunch::site()),
            SourceName::Qbitai => Box::new(qbitai::site()),
            SourceName::Synced => Box::new(synced::site()),
            SourceName::Jiqizhixin => Box::new(jiqizhixin::Jiqizhixin::new()),
            SourceName::AiEra => Box::new(ai_era::AiEra::new()),
        }
    }

    /// `data/<name>.jsonl`
    pub fn default_out(self) -> String {
        format!("data/{}.jsonl", self.as_str())
    }
}
