use serde::{Deserialize, Serialize};

/// A member of the etcd cluster as reported by `/v2/members`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Member {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(rename = "peerURLs", default)]
    pub peer_urls: Vec<String>,

    /// Addresses clients should talk to. Empty while a member is still joining.
    #[serde(rename = "clientURLs", default)]
    pub client_urls: Vec<String>,
}

/// Body of a `/v2/members` answer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct MemberList {
    #[serde(default)]
    pub members: Vec<Member>,
}

impl MemberList {
    /// All advertised client URLs, member by member, in listing order.
    pub fn client_urls(&self) -> impl Iterator<Item = &str> {
        self.members
            .iter()
            .flat_map(|member| member.client_urls.iter().map(String::as_str))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_members() {
        let body = r#"{
            "members": [
                {
                    "id": "272e204152",
                    "name": "infra1",
                    "peerURLs": ["http://10.0.0.10:2380"],
                    "clientURLs": ["http://10.0.0.10:2379"]
                },
                {
                    "id": "2225373f43",
                    "name": "infra2",
                    "peerURLs": ["http://10.0.0.11:2380"],
                    "clientURLs": ["http://10.0.0.11:2379", "http://10.0.0.11:4001"]
                }
            ]
        }"#;
        let list: MemberList = serde_json::from_str(body).unwrap();

        assert_eq!(list.members.len(), 2);
        assert_eq!(list.members[0].name, "infra1");
        assert_eq!(list.members[1].peer_urls, vec!["http://10.0.0.11:2380"]);

        let urls: Vec<&str> = list.client_urls().collect();
        assert_eq!(
            urls,
            vec![
                "http://10.0.0.10:2379",
                "http://10.0.0.11:2379",
                "http://10.0.0.11:4001"
            ]
        );
    }

    #[test]
    fn joining_member_has_no_client_urls() {
        let body = r#"{"members":[{"id":"a1","peerURLs":["http://10.0.0.12:2380"]}]}"#;
        let list: MemberList = serde_json::from_str(body).unwrap();

        assert!(list.members[0].client_urls.is_empty());
        assert_eq!(list.client_urls().count(), 0);
    }
}
