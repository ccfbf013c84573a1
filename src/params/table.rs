//! Parameter catalogue.
//!
//! Describes every remote parameter the controller registers with the
//! transport: its node, id, display name, and type (choice or bounded
//! integer) with the default the transport should retain at first boot.

use core::fmt::Write as _;

use heapless::String;

use crate::config::SprayerConfig;

/// A group of related parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Node {
    pub id: &'static str,
    pub name: &'static str,
}

pub const MODE_NODE: Node = Node {
    id: "mode-selector",
    name: "Mode selector",
};
pub const MANUAL_NODE: Node = Node {
    id: "manual-control",
    name: "Control sprayers manually",
};
pub const TIMED_NODE: Node = Node {
    id: "timed-control",
    name: "Automatic timed sprayer control",
};
pub const SEQUENTIAL_NODE: Node = Node {
    id: "sequential-control",
    name: "Sequential sprayer control",
};
pub const ALL_TOGETHER_NODE: Node = Node {
    id: "alltogether-control",
    name: "Sprayer control for all sprayers together",
};
pub const PURGE_NODE: Node = Node {
    id: "purgeall-control",
    name: "Sprayer control to purge all sprayers",
};

pub const NODES: [Node; 6] = [
    MODE_NODE,
    MANUAL_NODE,
    TIMED_NODE,
    SEQUENTIAL_NODE,
    ALL_TOGETHER_NODE,
    PURGE_NODE,
];

pub const MODE_CHOICES: [&str; 5] = ["Manual", "Timed", "Sequential", "All together", "Purge"];
pub const ON_OFF_CHOICES: [&str; 2] = ["OFF", "ON"];
pub const START_STOP_CHOICES: [&str; 2] = ["Start", "Stop"];

/// Type and default of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Choice {
        options: &'static [&'static str],
        default: &'static str,
    },
    Number {
        min: u32,
        max: u32,
        default: u32,
        unit: &'static str,
    },
}

/// One registered parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamSpec {
    pub node: &'static str,
    pub property: String<32>,
    pub name: String<48>,
    pub kind: ParamKind,
}

impl ParamSpec {
    /// Full `node/property` id, as carried by [`ParamUpdate`](crate::app::ports::ParamUpdate).
    pub fn id(&self) -> String<64> {
        let mut id = String::new();
        let _ = write!(id, "{}/{}", self.node, self.property);
        id
    }
}

fn spec(
    node: Node,
    property: core::fmt::Arguments<'_>,
    name: core::fmt::Arguments<'_>,
    kind: ParamKind,
) -> ParamSpec {
    let mut p = String::new();
    let _ = p.write_fmt(property);
    let mut n = String::new();
    let _ = n.write_fmt(name);
    ParamSpec {
        node: node.id,
        property: p,
        name: n,
        kind,
    }
}

/// Every parameter for a board configured by `config`, node by node.
pub fn catalogue(config: &SprayerConfig) -> Vec<ParamSpec> {
    let seconds = ParamKind::Number {
        min: 0,
        max: config.max_phase_secs,
        default: config.default_phase_secs,
        unit: "s",
    };
    let start_stop = ParamKind::Choice {
        options: &START_STOP_CHOICES,
        default: "Stop",
    };
    let channels = config.channel_count();
    let mut params = Vec::with_capacity(4 * channels + 8);

    params.push(spec(
        MODE_NODE,
        format_args!("mode"),
        format_args!("Select mode"),
        ParamKind::Choice {
            options: &MODE_CHOICES,
            default: "Manual",
        },
    ));

    for i in 1..=channels {
        params.push(spec(
            MANUAL_NODE,
            format_args!("sprayer{i}"),
            format_args!("Sprayer {i}"),
            ParamKind::Choice {
                options: &ON_OFF_CHOICES,
                default: "OFF",
            },
        ));
    }

    for i in 1..=channels {
        params.push(spec(
            TIMED_NODE,
            format_args!("sprayer{i}-ontime"),
            format_args!("Sprayer {i} on time"),
            seconds,
        ));
        params.push(spec(
            TIMED_NODE,
            format_args!("sprayer{i}-offtime"),
            format_args!("Sprayer {i} off time"),
            seconds,
        ));
    }
    for i in 1..=channels {
        params.push(spec(
            TIMED_NODE,
            format_args!("sprayer{i}-startstop"),
            format_args!("Start or stop sprayer {i}"),
            start_stop,
        ));
    }

    params.push(spec(
        SEQUENTIAL_NODE,
        format_args!("sequential-ontime"),
        format_args!("Sequential on time"),
        seconds,
    ));
    params.push(spec(
        SEQUENTIAL_NODE,
        format_args!("sequential-startstop"),
        format_args!("Start or stop sequential control"),
        start_stop,
    ));

    params.push(spec(
        ALL_TOGETHER_NODE,
        format_args!("alltogether-ontime"),
        format_args!("On time for all sprayers"),
        seconds,
    ));
    params.push(spec(
        ALL_TOGETHER_NODE,
        format_args!("alltogether-offtime"),
        format_args!("Off time for all sprayers"),
        seconds,
    ));
    params.push(spec(
        ALL_TOGETHER_NODE,
        format_args!("alltogether-startstop"),
        format_args!("Start or stop all sprayers"),
        start_stop,
    ));

    params.push(spec(
        PURGE_NODE,
        format_args!("purgeall-startstop"),
        format_args!("Start or stop purge"),
        start_stop,
    ));

    params
}
