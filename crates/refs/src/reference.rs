//! The `Ref` struct and the reference string codec.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{RefError, Result};

/// A structured decoding of a reference string.
///
/// A `Ref` binds ways of referring to a dataset to the dataset itself:
/// datasets can't easily contain their own hash information, and names are
/// only unique per registry. Refs are ephemeral: they are parsed, probed
/// against a store, and discarded, never persisted.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ref {
    /// Peername of the dataset owner
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub peername: String,
    /// ProfileID of the dataset owner
    #[serde(rename = "profileID", default, skip_serializing_if = "String::is_empty")]
    pub profile_id: String,
    /// Name of the dataset, unique per owner
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// Content-addressed path of a dataset version
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub path: String,
}

impl Ref {
    /// Returns the alias components (`peername[/name]`) of the reference.
    pub fn alias_string(&self) -> String {
        let mut s = self.peername.clone();
        if !self.name.is_empty() {
            s.push('/');
            s.push_str(&self.name);
        }
        s
    }

    /// True if only an identity (peername and/or profileID) is set.
    pub fn is_peer_ref(&self) -> bool {
        (!self.peername.is_empty() || !self.profile_id.is_empty())
            && self.name.is_empty()
            && self.path.is_empty()
    }

    /// True if no field is set.
    pub fn is_empty(&self) -> bool {
        self == &Ref::default()
    }

    /// Loose equivalence: refs match when they share a non-empty path, or
    /// when they agree on identity (profileID or peername) and name.
    /// Strict four-field equality is `==`.
    pub fn matches(&self, other: &Ref) -> bool {
        (!self.path.is_empty() && !other.path.is_empty() && self.path == other.path)
            || (self.profile_id == other.profile_id || self.peername == other.peername)
                && self.name == other.name
    }
}

impl fmt::Display for Ref {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.alias_string())?;
        if !self.profile_id.is_empty() || !self.path.is_empty() {
            write!(f, "@")?;
        }
        if !self.profile_id.is_empty() {
            write!(f, "{}", self.profile_id)?;
        }
        if !self.path.is_empty() {
            write!(f, "{}", self.path)?;
        }
        Ok(())
    }
}

/// Decodes a dataset reference from a string.
///
/// The full form of a reference is:
///
/// ```text
/// dataset_reference = peer_name/dataset_name@profile_id/network/hash
/// ```
///
/// Missing segments are represented as empty strings, with the network
/// defaulting to `/ipfs/` and the hash defaulting to the tip of version
/// history by convention. Dataset names and hashes are disambiguated by
/// checking whether a token parses to a valid base58 multihash, so all of
/// the following parse:
///
/// ```text
/// peer_name/dataset_name
/// /network/hash
/// peername
/// profile_id
/// @profile_id
/// @profile_id/network/hash
/// ```
///
/// An empty input returns [`RefError::Empty`]; an input that decodes to no
/// fields at all returns [`RefError::Malformed`].
pub fn parse_ref(refstr: &str) -> Result<Ref> {
    if refstr.is_empty() {
        return Err(RefError::Empty);
    }

    let mut r = Ref::default();

    // an @ splits the alias part from the identifier part
    if let Some(at) = refstr.find('@') {
        let (peername, name) = parse_alias(&refstr[..at]);
        r.peername = peername;
        r.name = name;
        let (profile_id, path) = parse_identifiers(&refstr[at + 1..]);
        r.profile_id = profile_id;
        r.path = path;
    } else {
        let toks: Vec<&str> = refstr.split('/').collect();
        let mut have_profile_id = false;
        let mut have_peername = false;
        let mut have_name = false;

        let mut i = 0;
        while i < toks.len() {
            let tok = toks[i];
            if is_base58_multihash(tok) {
                // the first hash encountered is a profileID
                if !have_profile_id {
                    r.profile_id = tok.to_string();
                    have_profile_id = true;
                    i += 1;
                    continue;
                }

                // a second hash starts the path. the token before it names
                // the network unless it was itself a hash
                if i > 0 && !is_base58_multihash(toks[i - 1]) {
                    r.path = format!("/{}/{}", toks[i - 1], toks[i..].join("/"));
                } else {
                    r.path = format!("/ipfs/{}", toks[i..].join("/"));
                }
                break;
            }

            // empty segments carry no information. skipping them keeps
            // inputs like "///" from parsing to a phantom path
            if tok.is_empty() {
                i += 1;
                continue;
            }

            if !have_peername {
                r.peername = tok.to_string();
                have_peername = true;
                i += 1;
                continue;
            }

            if !have_name {
                r.name = tok.to_string();
                have_name = true;
                i += 1;
                continue;
            }

            r.path = toks[i..].join("/");
            break;
        }
    }

    if r.is_empty() {
        return Err(RefError::Malformed(refstr.to_string()));
    }

    Ok(r)
}

/// Panics if the reference is invalid. Useful for tests, not for
/// production call sites.
pub fn must_parse_ref(refstr: &str) -> Ref {
    match parse_ref(refstr) {
        Ok(r) => r,
        Err(e) => panic!("parsing reference {refstr:?}: {e}"),
    }
}

fn parse_alias(alias: &str) -> (String, String) {
    let mut peername = String::new();
    let mut name = String::new();
    for (i, tok) in alias.split('/').enumerate() {
        match i {
            0 => peername = tok.to_string(),
            1 => name = tok.to_string(),
            _ => break,
        }
    }
    (peername, name)
}

fn parse_identifiers(ids: &str) -> (String, String) {
    let toks: Vec<&str> = ids.split('/').collect();
    match toks.len() {
        1 => {
            if toks[0].is_empty() {
                (String::new(), String::new())
            } else {
                (toks[0].to_string(), String::new())
            }
        }
        2 => {
            let path = if is_base58_multihash(toks[0]) && is_base58_multihash(toks[1]) {
                format!("/ipfs/{}", toks[1])
            } else {
                toks[1].to_string()
            };
            (toks[0].to_string(), path)
        }
        // three or more: network then hash, trailing tokens discarded
        _ => (
            toks[0].to_string(),
            format!("/{}/{}", toks[1], toks[2]),
        ),
    }
}

/// Reports whether `tok` base58-decodes to a valid multihash.
///
/// This single predicate is what lets peernames, profileIDs, and hashes
/// share position in the reference grammar without explicit separators.
pub fn is_base58_multihash(tok: &str) -> bool {
    let Ok(data) = bs58::decode(tok).into_vec() else {
        return false;
    };
    multihash::Multihash::<64>::from_bytes(&data).is_ok()
}

/// Compares two refs field by field, naming the first difference found.
pub fn compare_refs(a: &Ref, b: &Ref) -> Result<()> {
    let fields: [(&'static str, &str, &str); 4] = [
        ("profileID", &a.profile_id, &b.profile_id),
        ("peername", &a.peername, &b.peername),
        ("name", &a.name, &b.name),
        ("path", &a.path, &b.path),
    ];
    for (field, left, right) in fields {
        if left != right {
            return Err(RefError::FieldMismatch {
                field,
                left: left.to_string(),
                right: right.to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PEER_ID: &str = "QmYCvbfNbCwFR45HiNP45rwJgvatpiW38D961L5qAhUM5Y";
    const DS_HASH: &str = "QmRdexT18WuAKVX3vPusqmJTWLeNSeJgjmMbaF5QLGHna1";

    fn string_cases() -> Vec<(Ref, &'static str, &'static str)> {
        vec![
            (
                Ref {
                    peername: "peername".into(),
                    ..Default::default()
                },
                "peername",
                "peername",
            ),
            (
                Ref {
                    peername: "peername".into(),
                    name: "datasetname".into(),
                    ..Default::default()
                },
                "peername/datasetname",
                "peername/datasetname",
            ),
            (
                Ref {
                    profile_id: PEER_ID.into(),
                    ..Default::default()
                },
                "@QmYCvbfNbCwFR45HiNP45rwJgvatpiW38D961L5qAhUM5Y",
                "",
            ),
            (
                Ref {
                    path: format!("/ipfs/{DS_HASH}"),
                    ..Default::default()
                },
                "@/ipfs/QmRdexT18WuAKVX3vPusqmJTWLeNSeJgjmMbaF5QLGHna1",
                "",
            ),
            (
                Ref {
                    peername: "peername".into(),
                    name: "datasetname".into(),
                    profile_id: PEER_ID.into(),
                    ..Default::default()
                },
                "peername/datasetname@QmYCvbfNbCwFR45HiNP45rwJgvatpiW38D961L5qAhUM5Y",
                "peername/datasetname",
            ),
            (
                Ref {
                    peername: "peername".into(),
                    name: "datasetname".into(),
                    profile_id: PEER_ID.into(),
                    path: format!("/ipfs/{DS_HASH}"),
                },
                "peername/datasetname@QmYCvbfNbCwFR45HiNP45rwJgvatpiW38D961L5qAhUM5Y/ipfs/QmRdexT18WuAKVX3vPusqmJTWLeNSeJgjmMbaF5QLGHna1",
                "peername/datasetname",
            ),
            (
                Ref {
                    peername: "lucille".into(),
                    profile_id: PEER_ID.into(),
                    ..Default::default()
                },
                "lucille@QmYCvbfNbCwFR45HiNP45rwJgvatpiW38D961L5qAhUM5Y",
                "lucille",
            ),
            (
                Ref {
                    peername: "lucille".into(),
                    name: "ball".into(),
                    profile_id: PEER_ID.into(),
                    path: format!("/ipfs/{DS_HASH}"),
                },
                "lucille/ball@QmYCvbfNbCwFR45HiNP45rwJgvatpiW38D961L5qAhUM5Y/ipfs/QmRdexT18WuAKVX3vPusqmJTWLeNSeJgjmMbaF5QLGHna1",
                "lucille/ball",
            ),
            (
                Ref {
                    peername: "me".into(),
                    profile_id: "badID".into(),
                    ..Default::default()
                },
                "me@badID",
                "me",
            ),
        ]
    }

    #[test]
    fn ref_string() {
        for (i, (r, expect, _)) in string_cases().into_iter().enumerate() {
            assert_eq!(r.to_string(), expect, "case {i}");
        }
    }

    #[test]
    fn ref_alias_string() {
        for (i, (r, _, expect)) in string_cases().into_iter().enumerate() {
            assert_eq!(r.alias_string(), expect, "case {i}");
        }
    }

    #[test]
    fn parse_ref_forms() {
        let peername_ref = Ref {
            peername: "peername".into(),
            ..Default::default()
        };
        let name_ref = Ref {
            peername: "peername".into(),
            name: "datasetname".into(),
            ..Default::default()
        };
        let peer_id_ref = Ref {
            profile_id: PEER_ID.into(),
            ..Default::default()
        };
        let id_name_ref = Ref {
            profile_id: PEER_ID.into(),
            name: "datasetname".into(),
            ..Default::default()
        };
        let id_full_ref = Ref {
            profile_id: PEER_ID.into(),
            name: "datasetname".into(),
            path: format!("/network/{PEER_ID}"),
            ..Default::default()
        };
        let id_full_ipfs_ref = Ref {
            profile_id: PEER_ID.into(),
            name: "datasetname".into(),
            path: format!("/ipfs/{PEER_ID}"),
            ..Default::default()
        };
        let full_ref = Ref {
            peername: "peername".into(),
            name: "datasetname".into(),
            path: format!("/network/{PEER_ID}"),
            ..Default::default()
        };
        let full_ipfs_ref = Ref {
            peername: "peername".into(),
            name: "datasetname".into(),
            path: format!("/ipfs/{PEER_ID}"),
            ..Default::default()
        };
        let path_only_ref = Ref {
            path: format!("/network/{PEER_ID}"),
            ..Default::default()
        };
        let ipfs_only_ref = Ref {
            path: format!("/ipfs/{PEER_ID}"),
            ..Default::default()
        };
        let map_ref = Ref {
            path: "/map/QmcQsi93yUryyWvw6mPyDNoKRb7FcBx8QGBAeJ25kXQjnC".into(),
            ..Default::default()
        };

        let cases: Vec<(String, Ref)> = vec![
            ("peername/".into(), peername_ref.clone()),
            ("peername".into(), peername_ref),
            (format!("{PEER_ID}/"), peer_id_ref.clone()),
            (format!("/{PEER_ID}"), peer_id_ref),
            ("peername/datasetname/".into(), name_ref.clone()),
            ("peername/datasetname".into(), name_ref.clone()),
            ("peername/datasetname/@".into(), name_ref.clone()),
            ("peername/datasetname@".into(), name_ref),
            (format!("/datasetname@{PEER_ID}"), id_name_ref.clone()),
            (format!("/datasetname@{PEER_ID}/"), id_name_ref.clone()),
            (format!("/datasetname/@{PEER_ID}"), id_name_ref),
            (
                format!("peername/datasetname/@/network/{PEER_ID}"),
                full_ref.clone(),
            ),
            (
                format!("peername/datasetname@/network/{PEER_ID}"),
                full_ref.clone(),
            ),
            (
                format!("/datasetname@{PEER_ID}/network/{PEER_ID}"),
                id_full_ref,
            ),
            (
                format!("/datasetname/@{PEER_ID}/ipfs/{PEER_ID}"),
                id_full_ipfs_ref,
            ),
            (format!("@/network/{PEER_ID}"), path_only_ref),
            (format!("@/ipfs/{PEER_ID}"), ipfs_only_ref),
            (
                "@/map/QmcQsi93yUryyWvw6mPyDNoKRb7FcBx8QGBAeJ25kXQjnC".into(),
                map_ref,
            ),
            (
                format!("peername/datasetname/@/network/{PEER_ID}/junk/junk/..."),
                full_ref,
            ),
            (
                format!("peername/datasetname/@/ipfs/{PEER_ID}/junk/junk/..."),
                full_ipfs_ref,
            ),
        ];

        for (i, (input, expect)) in cases.iter().enumerate() {
            let got = parse_ref(input).unwrap_or_else(|e| panic!("case {i} ({input}): {e}"));
            if let Err(e) = compare_refs(&got, expect) {
                panic!("case {i} ({input}): {e}");
            }
        }
    }

    #[test]
    fn parse_empty_vs_malformed() {
        assert_eq!(parse_ref(""), Err(RefError::Empty));
        assert_eq!(parse_ref("///"), Err(RefError::Malformed("///".into())));
        assert!(matches!(parse_ref("/"), Err(RefError::Malformed(_))));
    }

    #[test]
    fn parse_round_trips() {
        let alias = Ref {
            peername: "b5".into(),
            name: "comics".into(),
            ..Default::default()
        };
        assert_eq!(parse_ref(&alias.to_string()).unwrap(), alias);

        let identified = Ref {
            profile_id: PEER_ID.into(),
            path: format!("/ipfs/{DS_HASH}"),
            ..Default::default()
        };
        let s = identified.to_string();
        assert_eq!(s, format!("@{PEER_ID}/ipfs/{DS_HASH}"));
        assert_eq!(parse_ref(&s).unwrap(), identified);
    }

    #[test]
    fn multihash_detection() {
        assert!(is_base58_multihash(PEER_ID));
        assert!(is_base58_multihash(DS_HASH));
        assert!(!is_base58_multihash("peername"));
        assert!(!is_base58_multihash("datasetname"));
        assert!(!is_base58_multihash(""));
        assert!(!is_base58_multihash("0O1l"));
    }

    #[test]
    fn match_and_equal_semantics() {
        let a = must_parse_ref("a/apples");
        assert!(a.matches(&must_parse_ref("a/apples")));
        assert!(!a.matches(&must_parse_ref("a/bananas")));

        // with no profileID on either side, a shared name is enough: the
        // empty IDs agree, so only the name is discriminating
        assert!(a.matches(&must_parse_ref("b/apples")));

        // a shared path matches regardless of names
        let mut c = must_parse_ref("a/apples");
        let mut d = must_parse_ref("b/bananas");
        c.path = format!("/ipfs/{DS_HASH}");
        d.path = format!("/ipfs/{DS_HASH}");
        assert!(c.matches(&d));
        assert_ne!(c, d);
    }

    #[test]
    fn peer_ref_and_empty() {
        assert!(must_parse_ref("peername").is_peer_ref());
        assert!(must_parse_ref(&format!("@{PEER_ID}")).is_peer_ref());
        assert!(!must_parse_ref("peername/datasetname").is_peer_ref());
        assert!(Ref::default().is_empty());
        assert!(!must_parse_ref("peername").is_empty());
    }

    #[test]
    fn serde_field_names() {
        let r = Ref {
            peername: "lucille".into(),
            profile_id: PEER_ID.into(),
            ..Default::default()
        };
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["peername"], "lucille");
        assert_eq!(json["profileID"], PEER_ID);
        assert!(json.get("name").is_none());
    }
}
