//! Static parameter table.
//!
//! Every persisted key is listed here once, together with the output
//! fields it feeds. The table is the only place where a key string is
//! tied to a runtime slot: lookups resolve a key to a [`ParamId`] (an index
//! into [`PARAMS`]) and outputs resolve their fields to `ParamId`s once at
//! construction, see [`OutputParams::resolve`].

use crate::control::outputs::{AC_G, AC_W, AC_Y, CF, CO2, DH, EF, LIGHT};

/// NVS keys are limited to 15 characters plus the terminating NUL.
pub const MAX_KEY_LEN: usize = 15;

/// Number of persisted parameters.
pub const NUM_PARAMS: usize = PARAMS.len();

/// Which field of an output a parameter drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputField {
    Mode,
    Setpoint,
    Deadband,
    Offset,
    OnTime,
    OffTime,
}

/// One `(output index, field)` pair a parameter is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Target {
    pub output: usize,
    pub field: OutputField,
}

/// Key plus its bindings. An empty `targets` slice means the parameter is
/// stored and settable but no output reads it.
#[derive(Debug, Clone, Copy)]
pub struct ParamDef {
    pub key: &'static str,
    pub targets: &'static [Target],
}

const fn to(output: usize, field: OutputField) -> Target {
    Target { output, field }
}

const fn def(key: &'static str, targets: &'static [Target]) -> ParamDef {
    ParamDef { key, targets }
}

use OutputField::{Deadband, Mode, OffTime, Offset, OnTime, Setpoint};

/// The fixed key set, in storage order.
pub const PARAMS: [ParamDef; 29] = [
    def("ac_g_mode", &[to(AC_G, Mode)]),
    def("ac_y_mode", &[to(AC_Y, Mode)]),
    def("ac_w_mode", &[to(AC_W, Mode)]),
    def("dh_mode", &[to(DH, Mode)]),
    def("ef_mode", &[to(EF, Mode)]),
    def("co2_mode", &[to(CO2, Mode)]),
    def("cf_mode", &[to(CF, Mode)]),
    def("light_mode", &[to(LIGHT, Mode)]),
    def("d_temp_sp", &[to(AC_Y, Setpoint), to(AC_W, Setpoint)]),
    def("n_temp_sp", &[]),
    def("rh_sp", &[to(DH, Setpoint)]),
    def("co2_sp", &[to(CO2, Setpoint)]),
    def("co2_db", &[to(CO2, Deadband)]),
    def("co2_os", &[to(CO2, Offset)]),
    def("light_out_pct", &[]),
    def("hitemp_dim", &[]),
    def("hitemp_cutout", &[]),
    def("hitemp_reset", &[]),
    def("cool_db", &[to(AC_Y, Deadband)]),
    def("cool_os", &[to(AC_Y, Offset)]),
    def("heat_db", &[to(AC_W, Deadband)]),
    def("heat_os", &[to(AC_W, Offset)]),
    def("dh_db", &[to(DH, Deadband)]),
    def("dh_os", &[to(DH, Offset)]),
    def("co2_setback_s", &[]),
    def(
        "l_on_time_ts",
        &[to(AC_G, OnTime), to(CO2, OnTime), to(CF, OnTime), to(LIGHT, OnTime)],
    ),
    def(
        "l_off_time_ts",
        &[to(AC_G, OffTime), to(CO2, OffTime), to(CF, OffTime), to(LIGHT, OffTime)],
    ),
    def("sr_len_s", &[]),
    def("ss_len_s", &[]),
];

/// Index of a parameter in [`PARAMS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParamId(u8);

impl ParamId {
    /// Resolve a key. `None` for anything outside the fixed set.
    pub fn from_key(key: &str) -> Option<Self> {
        PARAMS
            .iter()
            .position(|p| p.key == key)
            .map(|i| Self(i as u8))
    }

    /// Every parameter in storage order.
    pub fn all() -> impl Iterator<Item = Self> {
        (0..NUM_PARAMS).map(|i| Self(i as u8))
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }

    pub fn key(self) -> &'static str {
        PARAMS[self.index()].key
    }

    pub fn targets(self) -> &'static [Target] {
        PARAMS[self.index()].targets
    }
}

/// The parameters feeding one output, resolved from the table once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputParams {
    pub mode: Option<ParamId>,
    pub setpoint: Option<ParamId>,
    pub deadband: Option<ParamId>,
    pub offset: Option<ParamId>,
    pub on_time: Option<ParamId>,
    pub off_time: Option<ParamId>,
}

impl OutputParams {
    /// Invert the binding table for output `index`.
    pub fn resolve(index: usize) -> Self {
        let mut params = Self::default();
        for id in ParamId::all() {
            for target in id.targets().iter().filter(|t| t.output == index) {
                let slot = match target.field {
                    Mode => &mut params.mode,
                    Setpoint => &mut params.setpoint,
                    Deadband => &mut params.deadband,
                    Offset => &mut params.offset,
                    OnTime => &mut params.on_time,
                    OffTime => &mut params.off_time,
                };
                *slot = Some(id);
            }
        }
        params
    }
}
