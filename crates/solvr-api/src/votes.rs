// Vote endpoints

use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{DataEnvelope, MyVoteResponse, VoteDirection, VoteRequest, VoteResult};

impl ApiClient {
    /// The caller's existing vote on a post, or `None` if not voted.
    ///
    /// `GET /v1/posts/{id}/my-vote`. Requires authentication.
    pub async fn fetch_my_vote(&self, post_id: &str) -> Result<Option<VoteDirection>, Error> {
        let url = self.api_url(&format!("v1/posts/{post_id}/my-vote"))?;
        let envelope: DataEnvelope<MyVoteResponse> = self.get(url).await?;
        Ok(envelope.data.vote)
    }

    /// Cast a vote on a post.
    ///
    /// `POST /v1/posts/{id}/vote`. The returned tallies are authoritative and
    /// may differ from a naive +1/-1 (e.g. when flipping an existing vote).
    pub async fn submit_vote(
        &self,
        post_id: &str,
        direction: VoteDirection,
    ) -> Result<VoteResult, Error> {
        let url = self.api_url(&format!("v1/posts/{post_id}/vote"))?;
        debug!(post_id, %direction, "submitting vote");

        let envelope: DataEnvelope<VoteResult> =
            self.post(url, &VoteRequest { direction }).await?;
        Ok(envelope.data)
    }
}
