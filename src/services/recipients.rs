//! Notification recipient resolution.

use std::collections::HashSet;

use metrics::counter;
use sea_orm::ConnectionTrait;
use tracing::{debug, instrument};

use crate::error::ServiceError;

use super::mentions::{dedup_preserving_order, extract_mentions};
use super::roster::RosterQuery;

pub struct RecipientResolver<'a, C: ConnectionTrait> {
    roster: RosterQuery<'a, C>,
}

impl<'a, C: ConnectionTrait> RecipientResolver<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self {
            roster: RosterQuery::new(conn),
        }
    }

    /// Emails that should receive a notification from `teacher_email`:
    /// mentioned students that exist and are not suspended, in mention order,
    /// followed by the teacher's unsuspended roster, without duplicates.
    #[instrument(skip(self, text))]
    pub async fn resolve_recipients(
        &self,
        teacher_email: &str,
        text: Option<&str>,
    ) -> Result<Vec<String>, ServiceError> {
        let mentions = text.map(extract_mentions).unwrap_or_default();

        let mut recipients = self.verified_mentions(&mentions).await?;
        let roster = self.roster.roster_of(teacher_email, Some(false)).await?;
        recipients.extend(roster.into_iter().map(|student| student.email));
        dedup_preserving_order(&mut recipients);

        debug!(
            mentions = mentions.len(),
            recipients = recipients.len(),
            "recipients resolved"
        );
        counter!("classroom_recipients_resolved_total").increment(recipients.len() as u64);
        Ok(recipients)
    }

    /// Mentions backed by an unsuspended student, kept in mention order.
    async fn verified_mentions(&self, mentions: &[String]) -> Result<Vec<String>, ServiceError> {
        if mentions.is_empty() {
            return Ok(Vec::new());
        }

        let mut found: HashSet<String> = self
            .roster
            .by_emails(mentions, Some(false))
            .await?
            .into_iter()
            .map(|student| student.email)
            .collect();

        Ok(mentions
            .iter()
            .filter(|mention| found.remove(mention.as_str()))
            .cloned()
            .collect())
    }
}
