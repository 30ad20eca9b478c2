/*
 * Responsibility
 * - CAS で検証済みの Principal をアプリ側のユーザーへ写像する (verify step)
 * - デモ用なので DB は持たない。allow-list が設定されていればそれで絞り込む
 */
use std::collections::{BTreeMap, HashSet};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::services::cas::{BoxError, Principal, Verdict, Verify};

/// Application-side user record built from a CAS principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CasUser {
    pub net_id: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, Vec<String>>,
}

impl From<Principal> for CasUser {
    fn from(p: Principal) -> Self {
        Self {
            net_id: p.user,
            attributes: p.attributes,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct UserDirectory {
    // None: everyone who passes CAS is accepted.
    allowed: Option<HashSet<String>>,
}

impl UserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_allowed<I, S>(users: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let allowed: HashSet<String> = users.into_iter().map(Into::into).collect();
        Self {
            allowed: (!allowed.is_empty()).then_some(allowed),
        }
    }
}

#[async_trait]
impl Verify for UserDirectory {
    type User = CasUser;

    async fn verify(&self, principal: Principal) -> Result<Verdict<CasUser>, BoxError> {
        if let Some(allowed) = &self.allowed
            && !allowed.contains(&principal.user)
        {
            tracing::info!(user = %principal.user, "cas user not in allow-list");
            return Ok(Verdict::Reject {
                info: Some("user is not allowed".to_string()),
            });
        }

        Ok(Verdict::Accept {
            user: CasUser::from(principal),
            info: None,
        })
    }
}
