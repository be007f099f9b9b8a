//! Composition reports
//!
//! For every host: its composite, linearization, lifted requirements, the
//! traits it extends, and where each reachable member name resolves from.

use std::collections::BTreeSet;
use std::fmt::Write as _;

use owo_colors::OwoColorize;
use serde::Serialize;

use super::schema::Model;
use crate::traits::{is_private_name, HostType, MemberKind};

/// Where a member name resolves from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberRow {
    pub name: String,
    pub kind: String,
    pub source: String,
    /// Reached through trait forwarding rather than the host chain
    pub forwarded: bool,
}

/// Report for one host type
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostReport {
    pub name: String,
    pub parent: Option<String>,
    pub composite: String,
    pub mro: Vec<String>,
    pub extends: Vec<String>,
    pub required: Vec<String>,
    pub instantiable: bool,
    pub own_fallback: bool,
    pub members: Vec<MemberRow>,
}

/// Report for a whole model
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Report {
    pub hosts: Vec<HostReport>,
}

impl Report {
    /// Hosts that cannot be instantiated
    pub fn abstract_hosts(&self) -> impl Iterator<Item = &HostReport> {
        self.hosts.iter().filter(|h| !h.instantiable)
    }

    /// Pretty JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Human-readable rendering
    pub fn render(
        &self,
        colors: bool,
    ) -> String {
        let mut out = String::new();
        for host in &self.hosts {
            let title = match &host.parent {
                Some(parent) => format!("{}({})", host.name, parent),
                None => host.name.clone(),
            };
            if colors {
                let _ = writeln!(out, "{}", title.bold());
            } else {
                let _ = writeln!(out, "{}", title);
            }
            let _ = writeln!(out, "  composite: {}", host.composite);
            let _ = writeln!(out, "  mro: {}", host.mro.join(" -> "));
            let _ = writeln!(out, "  extends: {}", host.extends.join(", "));
            let status = if host.instantiable {
                "instantiable".to_string()
            } else {
                format!("abstract: {}", host.required.join(", "))
            };
            if colors && !host.instantiable {
                let _ = writeln!(out, "  {}", status.red());
            } else if colors {
                let _ = writeln!(out, "  {}", status.green());
            } else {
                let _ = writeln!(out, "  {}", status);
            }
            for row in &host.members {
                let via = if row.forwarded { "via" } else { "on" };
                let _ = writeln!(out, "    {:<24} {:<9} {} {}", row.name, row.kind, via, row.source);
            }
        }
        out
    }
}

impl Model {
    /// Build the report for every host
    pub fn report(
        &self,
        show_private: bool,
    ) -> Report {
        Report {
            hosts: self
                .hosts
                .values()
                .map(|host| self.host_report(host, show_private))
                .collect(),
        }
    }

    fn host_report(
        &self,
        host: &HostType,
        show_private: bool,
    ) -> HostReport {
        let composite = host.trait_class();
        let mut members = Vec::new();
        let mut seen = BTreeSet::new();

        for owner in host.chain() {
            for (name, member) in owner.members() {
                if seen.insert(name.clone()) {
                    members.push(MemberRow {
                        name: name.clone(),
                        kind: member.kind().to_string(),
                        source: owner.name().to_string(),
                        forwarded: false,
                    });
                }
            }
        }
        for (name, owner, member) in composite.resolution_table() {
            if !show_private && is_private_name(name) {
                continue;
            }
            if member.kind() == MemberKind::Required && !host.required().contains(name) {
                continue;
            }
            if seen.insert(name.to_string()) {
                members.push(MemberRow {
                    name: name.to_string(),
                    kind: member.kind().to_string(),
                    source: owner.name().to_string(),
                    forwarded: true,
                });
            }
        }

        HostReport {
            name: host.name().to_string(),
            parent: host.parent().map(|p| p.name().to_string()),
            composite: composite.name().to_string(),
            mro: composite.mro_names().into_iter().map(String::from).collect(),
            extends: self
                .traits
                .values()
                .filter(|t| host.extends(t))
                .map(|t| t.name().to_string())
                .collect(),
            required: host.required().iter().cloned().collect(),
            instantiable: !host.is_abstract(),
            own_fallback: host.fallback().is_some(),
            members,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::inspect::schema::{Schema, SchemaFormat};

    const SOURCE: &str = r#"(
        traits: [
            (name: "Base", data: { "__private__": 1, "shared": "base" }),
            (name: "Mid", bases: ["Base"], properties: ["size"], required: ["area"]),
            (name: "Other"),
        ],
        hosts: [
            (name: "Host", traits: Some(["Mid"]), data: { "shared": "host" }),
            (name: "Done", parent: Some("Host"), methods: [(name: "area")], fallback: Some(["magic"])),
        ],
    )"#;

    fn report(show_private: bool) -> super::Report {
        Schema::parse(SOURCE, SchemaFormat::Ron)
            .unwrap()
            .materialize()
            .unwrap()
            .report(show_private)
    }

    #[test]
    fn test_host_report_fields() {
        let report = report(false);
        let host = &report.hosts[0];
        assert_eq!(host.composite, "HostTrait");
        assert_eq!(host.mro, vec!["Mid", "Base"]);
        assert_eq!(host.extends, vec!["Base", "Mid"]);
        assert_eq!(host.required, vec!["area"]);
        assert!(!host.instantiable);

        let done = &report.hosts[1];
        assert!(done.instantiable);
        assert!(done.own_fallback);
        assert_eq!(done.parent.as_deref(), Some("Host"));
        assert_eq!(report.abstract_hosts().count(), 1);
    }

    #[test]
    fn test_member_table_sources() {
        let report = report(false);
        let rows: Vec<_> = report.hosts[0]
            .members
            .iter()
            .map(|r| (r.name.as_str(), r.source.as_str(), r.forwarded))
            .collect();
        assert_eq!(
            rows,
            vec![
                ("shared", "Host", false),
                ("size", "Mid", true),
                ("area", "Mid", true),
            ]
        );
    }

    #[test]
    fn test_private_names_hidden_by_default() {
        let hidden = report(false);
        let shown = report(true);
        let has_private = |r: &super::Report| {
            r.hosts[0].members.iter().any(|m| m.name == "__private__")
        };
        assert!(!has_private(&hidden));
        assert!(has_private(&shown));
    }

    #[test]
    fn test_render_plain_and_json() {
        let report = report(false);
        let text = report.render(false);
        assert!(text.contains("Done(Host)"));
        assert!(text.contains("abstract: area"));
        assert!(text.contains("mro: Mid -> Base"));

        let json = report.to_json().unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["hosts"][0]["composite"], "HostTrait");
    }
}
