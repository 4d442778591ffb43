//! Live adapter for the `CourseTable` port using a Supabase (PostgREST) table.

use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};

use super::checked_text;
use crate::ports::{CourseTable, PortError, PortFuture};

/// Course table hosted behind a PostgREST endpoint.
pub struct SupabaseTable {
    client: Client,
    base_url: String,
    api_key: String,
    table: String,
}

impl SupabaseTable {
    /// Creates a client for `table` on the project at `base_url`.
    #[must_use]
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        table: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
            table: table.into(),
        }
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url.trim_end_matches('/'), self.table)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.header("apikey", &self.api_key).bearer_auth(&self.api_key)
    }
}

/// A row projected to its course code.
#[derive(Deserialize)]
struct CourseCodeRow {
    course_code: String,
}

/// Body of a links update.
#[derive(Serialize)]
struct LinksUpdate<'a> {
    pdf_links: &'a [String],
}

impl CourseTable for SupabaseTable {
    fn fetch_course_codes(&self, offset: usize, limit: usize) -> PortFuture<'_, Vec<String>> {
        Box::pin(async move {
            let offset = offset.to_string();
            let limit = limit.to_string();
            let request = self.client.get(self.table_url()).query(&[
                ("select", "course_code"),
                ("offset", offset.as_str()),
                ("limit", limit.as_str()),
            ]);

            let response = self.authorized(request).send().await.map_err(|e| -> PortError {
                format!("Supabase read request failed: {e}").into()
            })?;
            let text = checked_text(response, "Supabase").await?;

            let rows: Vec<CourseCodeRow> = serde_json::from_str(&text).map_err(|e| -> PortError {
                format!("Failed to parse Supabase rows: {e}").into()
            })?;
            Ok(rows.into_iter().map(|row| row.course_code).collect())
        })
    }

    fn update_links<'a>(&'a self, course_code: &'a str, links: &'a [String]) -> PortFuture<'a, ()> {
        Box::pin(async move {
            let filter = format!("eq.{course_code}");
            let request = self
                .client
                .patch(self.table_url())
                .query(&[("course_code", filter.as_str())])
                .header("Prefer", "return=minimal")
                .json(&LinksUpdate { pdf_links: links });

            let response = self.authorized(request).send().await.map_err(|e| -> PortError {
                format!("Supabase update for {course_code} failed: {e}").into()
            })?;
            checked_text(response, "Supabase").await?;
            Ok(())
        })
    }
}
