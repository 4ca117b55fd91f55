//! Community scripts: explicit communities plus the tag-derived virtual
//! ones synthesized from question tags.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use df_core::error::{AppError, Result};
use df_core::models::{Community, CommunityRule, ResolvedCommunity, User};
use df_core::traits::{ForumRepo, QuestionQuery, QuestionSort};

use crate::views::{CommunityProfile, Page, QuestionSummary, TagCount};

/// Fields a moderator may change on an existing community.
#[derive(Debug, Default)]
pub struct CommunityPatch {
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub rules: Option<Vec<CommunityRule>>,
    pub is_public: Option<bool>,
}

pub struct CommunityService {
    repo: Arc<dyn ForumRepo>,
}

impl CommunityService {
    pub fn new(repo: Arc<dyn ForumRepo>) -> Self {
        Self { repo }
    }

    pub async fn list(
        &self,
        search: Option<String>,
        page: i64,
        limit: i64,
    ) -> Result<Page<CommunityProfile>> {
        let limit = limit.max(1);
        let page = page.max(1);
        // Saturate: a page past the end is an empty page, never a panic.
        let offset = (page - 1).saturating_mul(limit);
        let communities = self
            .repo
            .list_communities(search.as_deref(), limit, offset)
            .await?;
        let total = self.repo.count_communities(search.as_deref()).await?;
        let profiles = communities.iter().map(CommunityProfile::from_stored).collect();
        Ok(Page::new(profiles, total, page, limit))
    }

    /// Stored public communities merged with placeholders for tags that
    /// have questions but no community row. Stored rows keep their stored
    /// post_count (drift and all); placeholders carry the live tag count.
    pub async fn popular(&self) -> Result<Vec<CommunityProfile>> {
        let stored = self.repo.list_public_communities().await?;
        let tags = self.repo.tag_counts(i64::MAX).await?;

        let mut profiles: Vec<CommunityProfile> =
            stored.iter().map(CommunityProfile::from_stored).collect();

        for (name, count) in tags {
            if !stored.iter().any(|c| c.name == name) {
                profiles.push(CommunityProfile::from_resolved(&ResolvedCommunity::Synthesized {
                    name,
                    post_count: count,
                }));
            }
        }

        profiles.sort_by(|a, b| {
            b.post_count
                .cmp(&a.post_count)
                .then_with(|| b.member_count.cmp(&a.member_count))
        });
        Ok(profiles)
    }

    /// The single lookup for both community shapes. A stored row wins and
    /// gets its post_count recomputed from live tag usage; otherwise a tag
    /// with at least one question yields a synthesized placeholder.
    pub async fn resolve(&self, name: &str) -> Result<ResolvedCommunity> {
        let name = name.trim().to_lowercase();
        if let Some(mut community) = self.repo.get_community_by_name(&name).await? {
            community.post_count = self.repo.count_questions_with_tag(&name).await?;
            return Ok(ResolvedCommunity::Stored(community));
        }

        let live_count = self.repo.count_questions_with_tag(&name).await?;
        if live_count > 0 {
            Ok(ResolvedCommunity::Synthesized { name, post_count: live_count })
        } else {
            Err(AppError::not_found("Community", name))
        }
    }

    /// Profile plus the ten most recent questions carrying the tag.
    pub async fn profile(&self, name: &str) -> Result<(CommunityProfile, Vec<QuestionSummary>)> {
        let resolved = self.resolve(name).await?;
        let profile = CommunityProfile::from_resolved(&resolved);

        let query = QuestionQuery {
            tag: Some(profile.name.clone()),
            sort: QuestionSort::Newest,
            limit: 10,
            ..Default::default()
        };
        let questions = self.repo.list_questions(&query).await?;
        let now = Utc::now();
        let mut summaries = Vec::with_capacity(questions.len());
        for question in &questions {
            let author = self.repo.get_user(question.author_id).await?;
            summaries.push(QuestionSummary::build(question, author.as_ref(), now));
        }
        Ok((profile, summaries))
    }

    /// Creates an explicit community; the creator becomes its first moderator.
    pub async fn create(
        &self,
        creator: &User,
        name: String,
        display_name: String,
        description: String,
        rules: Vec<CommunityRule>,
    ) -> Result<CommunityProfile> {
        let name = name.trim().to_lowercase();
        if self.repo.get_community_by_name(&name).await?.is_some() {
            return Err(AppError::Conflict(format!("community '{name}' already exists")));
        }

        let community = Community {
            id: Uuid::now_v7(),
            name,
            display_name: display_name.trim().to_string(),
            description,
            created_by: creator.id,
            moderators: vec![creator.id],
            member_count: 0,
            post_count: 0,
            is_public: true,
            rules,
            created_at: Utc::now(),
        };
        self.repo.create_community(community.clone()).await?;
        log::info!("community '{}' created by {}", community.name, creator.username);
        Ok(CommunityProfile::from_stored(&community))
    }

    /// Moderators and the creator may update; everyone else is rejected.
    pub async fn update(&self, name: &str, actor: Uuid, patch: CommunityPatch) -> Result<CommunityProfile> {
        let mut community = self
            .repo
            .get_community_by_name(&name.trim().to_lowercase())
            .await?
            .ok_or_else(|| AppError::not_found("Community", name))?;

        let is_moderator =
            community.created_by == actor || community.moderators.contains(&actor);
        if !is_moderator {
            return Err(AppError::Unauthorized("not a moderator of this community".into()));
        }

        if let Some(display_name) = patch.display_name {
            community.display_name = display_name.trim().to_string();
        }
        if let Some(description) = patch.description {
            community.description = description;
        }
        if let Some(rules) = patch.rules {
            community.rules = rules;
        }
        if let Some(is_public) = patch.is_public {
            community.is_public = is_public;
        }

        self.repo.update_community(&community).await?;
        Ok(CommunityProfile::from_stored(&community))
    }

    /// Membership is a bare counter; it floors at zero on leave.
    pub async fn join(&self, name: &str) -> Result<i64> {
        let mut community = self
            .repo
            .get_community_by_name(&name.trim().to_lowercase())
            .await?
            .ok_or_else(|| AppError::not_found("Community", name))?;
        community.member_count += 1;
        self.repo.update_community(&community).await?;
        Ok(community.member_count)
    }

    pub async fn leave(&self, name: &str) -> Result<i64> {
        let mut community = self
            .repo
            .get_community_by_name(&name.trim().to_lowercase())
            .await?
            .ok_or_else(|| AppError::not_found("Community", name))?;
        community.member_count = (community.member_count - 1).max(0);
        self.repo.update_community(&community).await?;
        Ok(community.member_count)
    }

    /// Top 20 tags by usage, regardless of whether a community row exists.
    pub async fn popular_tags(&self) -> Result<Vec<TagCount>> {
        let tags = self.repo.tag_counts(20).await?;
        Ok(tags.into_iter().map(|(name, count)| TagCount { name, count }).collect())
    }
}
