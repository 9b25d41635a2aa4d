// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Metasheet bucket: append-only notation records, regex-findable.
//!
//! The row key is the sheet's property map serialized as JSON (user props
//! plus attribution fields), which is what the find path's substring
//! patterns match against.

use crate::db::{Database, StoreError};
use crate::query;
use lwf_core::{codec, Metasheet};
use std::collections::BTreeMap;
use tracing::error;

const TABLE: &str = "MetasheetStore";
const PILLAR: &str = "repo.meta";

impl Database {
    /// Append a metasheet. Repeated notations append; nothing is replaced.
    pub async fn put_metasheet(&self, sheet: &Metasheet) {
        let mut keys: BTreeMap<String, String> = sheet.props().clone();
        keys.insert("jobId".to_string(), sheet.job_id().to_string());
        keys.insert("site".to_string(), sheet.site_name().to_string());
        keys.insert("url".to_string(), sheet.site_url().to_string());
        keys.insert("sheetId".to_string(), sheet.sheet_id().to_string());
        let key = match serde_json::to_string(&keys) {
            Ok(k) => k,
            Err(e) => {
                error!(error = %e, "put_metasheet key serialization failed");
                return;
            }
        };
        let blob = match codec::encode(sheet) {
            Ok(b) => b,
            Err(e) => {
                self.log_write_error("put_metasheet", &StoreError::Codec(e));
                return;
            }
        };
        if let Err(e) = self.put(TABLE, sheet.site_name(), PILLAR, &key, &blob).await {
            self.log_write_error("put_metasheet", &e);
        }
    }

    /// Find metasheets whose properties satisfy every clause of the query.
    /// Clause values are regexes after wildcard translation.
    pub fn find_metasheets(&self, query_regexs: &BTreeMap<String, String>) -> Vec<Metasheet> {
        let result = self.reading(|conn| {
            let mut sql = String::from("SELECT data FROM MetasheetStore");
            let mut params: Vec<String> = Vec::new();
            for (i, (field, pattern)) in query_regexs.iter().enumerate() {
                sql.push_str(if i == 0 { " WHERE " } else { " AND " });
                sql.push_str(&format!("key REGEXP ?{}", i + 1));
                params.push(query::key_clause(field, pattern));
            }
            sql.push_str(" ORDER BY ts DESC, id DESC");
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(
                rusqlite::params_from_iter(params.iter()),
                |r| r.get::<_, String>(0),
            )?;
            let mut out = Vec::new();
            for row in rows {
                out.push(codec::decode(&row?)?);
            }
            Ok(out)
        });
        match result {
            Ok(v) => v,
            Err(e) => {
                error!(error = %e, "find_metasheets failed");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
#[path = "meta_tests.rs"]
mod tests;
