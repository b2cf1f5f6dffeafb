//! Field numbers of the transport index messages.
//!
//! ```text
//! File            := 1:version  2:TransportIndex
//! TransportIndex  := 1:name  3:Routes  6:StopsTree?  9:StringTable
//! Routes          := 1:Route*
//! Route           := 1:id 3:type 4:operator? 5:ref 6:name 7:name_en?
//!                    8:distance 15:RouteStop* (forward) 16:RouteStop* (backward)
//! RouteStop       := 1:id 2:dx 3:dy 6:name 7:name_en?
//! StopsTree       := 1:left 2:right 3:top 4:bottom 7:StopsTree* 8:Stop*
//! Stop            := 1:dx 2:dy 5:id 6:name 7:name_en? 16:route*
//! StringTable     := 1:s*
//! ```
//!
//! Name, type and operator fields hold string-table ids; `ref` is inline.
//! Route-stop ids and coordinates are deltas against the previous stop of the
//! same list.  Tree boxes are deltas against the parent box (the root against
//! zero); stop coordinates are relative to the enclosing box's left and top.

/// Version written in the file header.
pub const INDEX_VERSION: u64 = 1;

pub mod file {
    pub const VERSION: u32 = 1;
    pub const TRANSPORT_INDEX: u32 = 2;
}

pub mod index {
    pub const NAME: u32 = 1;
    pub const ROUTES: u32 = 3;
    pub const STOPS_TREE: u32 = 6;
    pub const STRING_TABLE: u32 = 9;
}

pub mod routes {
    pub const ROUTE: u32 = 1;
}

pub mod route {
    pub const ID: u32 = 1;
    pub const TYPE: u32 = 3;
    pub const OPERATOR: u32 = 4;
    pub const REF: u32 = 5;
    pub const NAME: u32 = 6;
    pub const NAME_EN: u32 = 7;
    pub const DISTANCE: u32 = 8;
    pub const FORWARD_STOP: u32 = 15;
    pub const BACKWARD_STOP: u32 = 16;
}

pub mod route_stop {
    pub const ID: u32 = 1;
    pub const DX: u32 = 2;
    pub const DY: u32 = 3;
    pub const NAME: u32 = 6;
    pub const NAME_EN: u32 = 7;
}

pub mod tree {
    pub const LEFT: u32 = 1;
    pub const RIGHT: u32 = 2;
    pub const TOP: u32 = 3;
    pub const BOTTOM: u32 = 4;
    pub const SUBTREE: u32 = 7;
    pub const STOP: u32 = 8;
}

pub mod stop {
    pub const DX: u32 = 1;
    pub const DY: u32 = 2;
    pub const ID: u32 = 5;
    pub const NAME: u32 = 6;
    pub const NAME_EN: u32 = 7;
    pub const ROUTE: u32 = 16;
}

pub mod string_table {
    pub const STRING: u32 = 1;
}
