//! Route extraction: one tagged relation → one [`TransportRoute`] with its
//! stops ordered per direction.
//!
//! # Ordinal resolution
//!
//! Stop members carry their direction and, optionally, their position in the
//! role string (`stop_forward3`, `stop_backward`, `stop12`, `stop`, …):
//!
//! - role contains `forward` → forward; `backward` → backward; both words →
//!   an explicit stop in both directions; neither → a *common* stop served
//!   in both directions.
//! - a trailing run of digits is the explicit ordinal; otherwise the ordinal
//!   is a running counter (forward and common stops count toward the
//!   forward counter, backward stops toward the backward counter, and common
//!   stops without digits use the overall stop counter).  A stop tagged both
//!   ways counts toward both counters and takes the forward one.
//! - common stops enter the backward list as [`BackwardOrdinal::Pending`].
//!   After the scan each pending ordinal `n` resolves to `last + n + 1`,
//!   where `last` is the highest explicit backward ordinal (0 when there is
//!   none), so common stops follow every explicit backward stop in relation
//!   order, `stop0` included.
//!
//! Both lists are then stably sorted by ordinal; members with equal ordinals
//! keep their relation order.

use ti_core::{RouteId, RouteWay, StopId, TransportMode, TransportRoute, TransportStop};

use crate::relation::{MemberElement, OsmNode, Relation};

/// Ordinal of an entry in the backward list during extraction.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BackwardOrdinal {
    /// An explicit backward stop (role mentions `backward`), ordinal final.
    Resolved(i64),
    /// A common stop whose backward position is only known once every
    /// member has been scanned.
    Pending(i64),
}

impl BackwardOrdinal {
    /// Final ordinal given the highest resolved ordinal in the list.  Pending
    /// entries always land strictly after `last_resolved`.
    #[inline]
    pub fn resolve(self, last_resolved: i64) -> i64 {
        match self {
            BackwardOrdinal::Resolved(n) => n,
            BackwardOrdinal::Pending(n)  => last_resolved.saturating_add(n).saturating_add(1),
        }
    }
}

/// Direction class of a stop member, derived from its role.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum StopRole {
    Forward,
    Backward,
    /// Both `forward` and `backward` in the role.
    Both,
    Common,
}

impl StopRole {
    fn of(role: &str) -> StopRole {
        match (role.contains("forward"), role.contains("backward")) {
            (true, true)   => StopRole::Both,
            (true, false)  => StopRole::Forward,
            (false, true)  => StopRole::Backward,
            (false, false) => StopRole::Common,
        }
    }

    fn counts_forward(self) -> bool {
        self != StopRole::Backward
    }

    fn counts_backward(self) -> bool {
        matches!(self, StopRole::Backward | StopRole::Both)
    }
}

/// Explicit ordinal from a trailing run of ASCII digits, e.g. `stop_forward12`
/// → `12`.  `None` when the role does not end in a digit or the number does
/// not fit.
pub fn trailing_ordinal(role: &str) -> Option<i64> {
    let digits = role.len() - role.trim_end_matches(|c: char| c.is_ascii_digit()).len();
    if digits == 0 {
        return None;
    }
    role[role.len() - digits..].parse().ok()
}

/// Build a stop from a member node: `name` (empty when absent) and `name:en`.
pub fn stop_from_node(node: &OsmNode) -> TransportStop {
    TransportStop {
        id:       StopId(node.id),
        location: node.location,
        name:     node.tag("name").unwrap_or_default().to_owned(),
        name_en:  node.tag("name:en").map(str::to_owned),
    }
}

/// Stateless extractor for route relations.
#[derive(Copy, Clone, Debug, Default)]
pub struct RouteExtractor;

impl RouteExtractor {
    pub fn new() -> Self {
        RouteExtractor
    }

    /// Turn a relation into a route, or `None` when the relation is not a
    /// supported transit route (missing `route`/`ref`, unsupported mode) or
    /// has no stop members at all.
    pub fn extract(&self, rel: &Relation) -> Option<TransportRoute> {
        let mode = TransportMode::from_tag(rel.tag("route")?)?;
        let r#ref = rel.tag("ref")?;

        let mut route = TransportRoute::new(RouteId(rel.id), mode, r#ref);
        route.operator = rel.tag("operator").map(str::to_owned);
        route.name = rel.tag("name").unwrap_or_default().to_owned();
        route.name_en = rel.tag("name:en").map(str::to_owned);

        let mut forward: Vec<(TransportStop, i64)> = Vec::new();
        let mut backward: Vec<(TransportStop, BackwardOrdinal)> = Vec::new();
        let mut current_stop = 0i64;
        let mut forward_stop = 0i64;
        let mut backward_stop = 0i64;

        for member in &rel.members {
            match &member.element {
                MemberElement::Node(node) if member.role.contains("stop") => {
                    let role = StopRole::of(&member.role);
                    current_stop += 1;
                    if role.counts_forward() {
                        forward_stop += 1;
                    }
                    if role.counts_backward() {
                        backward_stop += 1;
                    }

                    let ordinal = trailing_ordinal(&member.role).unwrap_or(match role {
                        StopRole::Forward | StopRole::Both => forward_stop,
                        StopRole::Backward => backward_stop,
                        StopRole::Common => current_stop,
                    });

                    let stop = stop_from_node(node);
                    match role {
                        StopRole::Forward => forward.push((stop, ordinal)),
                        StopRole::Backward => {
                            backward.push((stop, BackwardOrdinal::Resolved(ordinal)));
                        }
                        StopRole::Both => {
                            forward.push((stop.clone(), ordinal));
                            backward.push((stop, BackwardOrdinal::Resolved(ordinal)));
                        }
                        StopRole::Common => {
                            forward.push((stop.clone(), ordinal));
                            backward.push((stop, BackwardOrdinal::Pending(ordinal)));
                        }
                    }
                }
                MemberElement::Way(way) if !member.role.contains("stop") => route.ways.push(RouteWay {
                    id:     way.id,
                    points: way.points.clone(),
                }),
                _ => {}
            }
        }

        if forward.is_empty() && backward.is_empty() {
            return None;
        }

        forward.sort_by_key(|(_, ordinal)| *ordinal);
        route.forward = forward.into_iter().map(|(stop, _)| stop).collect();

        let last_resolved = backward
            .iter()
            .filter_map(|(_, ordinal)| match ordinal {
                BackwardOrdinal::Resolved(n) => Some(*n),
                BackwardOrdinal::Pending(_)  => None,
            })
            .max()
            .unwrap_or(0);
        let mut backward: Vec<(TransportStop, i64)> = backward
            .into_iter()
            .map(|(stop, ordinal)| (stop, ordinal.resolve(last_resolved)))
            .collect();
        backward.sort_by_key(|(_, ordinal)| *ordinal);
        route.backward = backward.into_iter().map(|(stop, _)| stop).collect();

        Some(route)
    }
}
