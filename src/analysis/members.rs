// Member classification
//
// Partitions the members of a class by the ancestor that defines them and
// by kind, in the order a class page presents them.

use super::visibility::is_visible_in;
use crate::runtime::{AccessError, ObjectId, ObjectKind, Reflect};
use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use tracing::{debug, warn};

/// Kind of a class member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberKind {
    Method,
    ClassMethod,
    StaticMethod,
    ReadonlyProperty,
    DataDescriptor,
    PlainData,
}

impl MemberKind {
    /// Order in which kinds are emitted for each ancestor
    pub const ORDER: [MemberKind; 6] = [
        MemberKind::Method,
        MemberKind::ClassMethod,
        MemberKind::StaticMethod,
        MemberKind::ReadonlyProperty,
        MemberKind::DataDescriptor,
        MemberKind::PlainData,
    ];

    /// Heading used for a group of this kind
    pub fn label(self) -> &'static str {
        match self {
            MemberKind::Method => "Methods",
            MemberKind::ClassMethod => "Class methods",
            MemberKind::StaticMethod => "Static methods",
            MemberKind::ReadonlyProperty => "Readonly properties",
            MemberKind::DataDescriptor => "Data descriptors",
            MemberKind::PlainData => "Data and other attributes",
        }
    }

    /// Kind of a value as stored in a class namespace
    pub fn of_raw(rt: &impl Reflect, raw: ObjectId) -> Self {
        match rt.kind(raw) {
            ObjectKind::StaticMethod => MemberKind::StaticMethod,
            ObjectKind::ClassMethod => MemberKind::ClassMethod,
            ObjectKind::Property => match rt.property(raw) {
                Some(info) if info.setter.is_none() => MemberKind::ReadonlyProperty,
                _ => MemberKind::DataDescriptor,
            },
            ObjectKind::DataDescriptor => MemberKind::DataDescriptor,
            ObjectKind::Routine | ObjectKind::MethodDescriptor => MemberKind::Method,
            _ => MemberKind::PlainData,
        }
    }

    pub fn is_descriptor(self) -> bool {
        matches!(self, MemberKind::ReadonlyProperty | MemberKind::DataDescriptor)
    }
}

/// Current value of a member read through its class
#[derive(Debug, Clone, PartialEq)]
pub enum MemberValue {
    Resolved(ObjectId),
    /// Reading the member failed; it is documented as plain data
    Degraded(AccessError),
}

/// One member of a class
#[derive(Debug, Clone, PartialEq)]
pub struct MemberRecord {
    pub name: String,
    pub kind: MemberKind,
    /// Class whose own namespace defines the member
    pub owner: ObjectId,
    /// Value as stored in the owner's namespace
    pub raw: ObjectId,
    pub value: MemberValue,
}

/// Which ancestor a group of members comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    DefinedHere,
    InheritedFrom(ObjectId),
}

/// Members of one kind from one ancestor
#[derive(Debug, Clone, PartialEq)]
pub struct MemberGroup {
    pub ownership: Ownership,
    pub kind: MemberKind,
    pub members: Vec<MemberRecord>,
}

/// A classified name before its value is read
#[derive(Debug, Clone)]
struct RawMember {
    name: String,
    kind: MemberKind,
    owner: ObjectId,
    raw: ObjectId,
}

/// Every name reachable through the ancestry of `class`, sorted by name,
/// with its defining class and kind.
///
/// Classes that refuse enumeration yield nothing.
pub fn classify_class_attrs(rt: &impl Reflect, class: ObjectId) -> Vec<(String, MemberKind, ObjectId, ObjectId)> {
    raw_members(rt, class)
        .into_iter()
        .map(|m| (m.name, m.kind, m.owner, m.raw))
        .collect()
}

fn raw_members(rt: &impl Reflect, class: ObjectId) -> Vec<RawMember> {
    if let Some(reason) = rt.enumeration_error(class) {
        warn!(class = ?rt.name(class), reason, "skipping member enumeration");
        return Vec::new();
    }

    let ancestry = rt.ancestry(class);
    let mut first_owner: HashMap<&str, (ObjectId, ObjectId)> = HashMap::new();
    for &ancestor in &ancestry {
        for (name, raw) in rt.list_members(ancestor) {
            first_owner.entry(name).or_insert((ancestor, raw));
        }
    }

    let mut members: Vec<RawMember> = first_owner
        .into_iter()
        .map(|(name, (owner, raw))| RawMember {
            name: name.to_string(),
            kind: MemberKind::of_raw(rt, raw),
            owner,
            raw,
        })
        .collect();
    members.sort_by(|a, b| a.name.cmp(&b.name));
    members
}

/// Sort in place by declared field order, then by name
fn sort_members(rt: &impl Reflect, class: ObjectId, members: &mut [RawMember]) {
    let fields = rt.fields(class).unwrap_or_default();
    let count = fields.len() as isize;
    let order: HashMap<&str, isize> = fields
        .iter()
        .enumerate()
        .map(|(i, name)| (name.as_str(), i as isize - count))
        .collect();
    members.sort_by(|a, b| {
        let ka = order.get(a.name.as_str()).copied().unwrap_or(0);
        let kb = order.get(b.name.as_str()).copied().unwrap_or(0);
        ka.cmp(&kb).then_with(|| a.name.cmp(&b.name))
    });
}

fn read_value(rt: &impl Reflect, class: ObjectId, member: &RawMember) -> MemberValue {
    // Descriptors are documented as found in the namespace
    if member.kind.is_descriptor() {
        return MemberValue::Resolved(member.raw);
    }
    match rt.get_attr(class, &member.name) {
        Ok(Some(value)) => MemberValue::Resolved(value),
        Ok(None) => MemberValue::Resolved(member.raw),
        Err(err) => {
            debug!(member = %member.name, error = %err, "member degraded to data");
            MemberValue::Degraded(err)
        }
    }
}

/// Group the visible members of `class` by defining ancestor, then by kind.
///
/// Ancestors are visited in method resolution order. Members owned by the
/// universal root type are dropped unless `class` is the root itself.
pub fn classify(rt: &impl Reflect, class: ObjectId) -> Vec<MemberGroup> {
    let root = rt.root_type();
    let mut remaining: Vec<RawMember> = raw_members(rt, class)
        .into_iter()
        .filter(|m| is_visible_in(rt, &m.name, None, Some(class)))
        .collect();
    let mut ancestry: VecDeque<ObjectId> = rt.ancestry(class).into();
    let mut groups = Vec::new();

    while let Some(first) = remaining.first() {
        let this_class = ancestry.pop_front().unwrap_or(first.owner);
        let (mut mine, inherited): (Vec<RawMember>, Vec<RawMember>) =
            remaining.into_iter().partition(|m| m.owner == this_class);
        remaining = inherited;

        if this_class == root && class != root {
            continue;
        }
        let ownership = if this_class == class {
            Ownership::DefinedHere
        } else {
            Ownership::InheritedFrom(this_class)
        };

        sort_members(rt, class, &mut mine);
        for kind in MemberKind::ORDER {
            let members: Vec<MemberRecord> = mine
                .iter()
                .filter(|m| m.kind == kind)
                .map(|m| MemberRecord {
                    name: m.name.clone(),
                    kind,
                    owner: m.owner,
                    raw: m.raw,
                    value: read_value(rt, class, m),
                })
                .collect();
            if !members.is_empty() {
                groups.push(MemberGroup {
                    ownership,
                    kind,
                    members,
                });
            }
        }
    }
    groups
}
