//! Three-phase recursive-descent parser: orchestrates the [`crate::scanner::Scanner`] against
//! the [`crate::devices`]/[`crate::network`]/[`crate::monitors`] model, with per-statement
//! error recovery.
//!
//! The grammar (INIT block, then CONNECT block, then an optional MONITOR block) is linear in
//! its three phases; within a phase, a small state machine tracks what token kind is expected
//! next (`Expect`), whether the current token begins a new statement (`new_line`), and an
//! accumulator for the statement under construction. A syntax error inside a statement reports
//! once and skips forward to the next semicolon or section keyword (`recover`); a device id that
//! failed `make-device` is remembered in `error_devices` so later references to it do not
//! re-report (cascade suppression).

use std::collections::HashSet;

use crate::devices::{DeviceId, DeviceKind, InputPort, OutputPort, PortRef, Qualifier};
use crate::error::{ErrorLog, SemanticError, SyntaxError};
use crate::monitors::Monitors;
use crate::names::Names;
use crate::network::Network;
use crate::scanner::{CaretAnchor, Scanner, Token, TokenKind};

/// What the parser expects from the next token. A few variants (`ConnectSource`,
/// `MonitorBody`) are composite: more than one [`TokenKind`] satisfies them, reflecting
/// grammar positions where the bare-name and dotted forms are both legal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expect {
    DeviceName,
    InitIs,
    DeviceType,
    InitSwitch,
    InitClk,
    InitWith,
    Number,
    SiggenWave,
    InitGate,
    Semicolon,
    ConnectSource,
    Connection,
    DeviceIn,
    MonitorKeyword,
    MonitorBody,
    Eof,
}

impl Expect {
    fn matches(self, kind: TokenKind) -> bool {
        match self {
            Expect::DeviceName => kind == TokenKind::DeviceName,
            Expect::InitIs => kind == TokenKind::InitIs,
            Expect::DeviceType => kind == TokenKind::DeviceType,
            Expect::InitSwitch => kind == TokenKind::InitSwitch,
            Expect::InitClk => kind == TokenKind::InitClk,
            Expect::InitWith => kind == TokenKind::InitWith,
            Expect::Number => kind == TokenKind::Number,
            Expect::SiggenWave => kind == TokenKind::SiggenWave,
            Expect::InitGate => kind == TokenKind::InitGate,
            Expect::Semicolon => kind == TokenKind::Semicolon,
            Expect::ConnectSource => matches!(kind, TokenKind::DeviceName | TokenKind::DeviceOut),
            Expect::Connection => kind == TokenKind::Connection,
            Expect::DeviceIn => kind == TokenKind::DeviceIn,
            Expect::MonitorKeyword => kind == TokenKind::InitMonitor,
            Expect::MonitorBody => {
                matches!(kind, TokenKind::DeviceName | TokenKind::DeviceOut | TokenKind::Semicolon)
            }
            Expect::Eof => kind == TokenKind::Eof,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Init,
    Connect,
    Monitor,
}

#[derive(Debug, Default)]
struct DeviceHolder {
    device_id: Option<DeviceId>,
    device_kind: Option<DeviceKind>,
    qualifier: Option<Qualifier>,
}

#[derive(Debug, Default, Clone, Copy)]
struct ConnectionHolder {
    first: Option<(DeviceId, Option<PortRef>)>,
    second: Option<(DeviceId, Option<PortRef>)>,
}

struct State {
    phase: Phase,
    expect: Expect,
    new_line: bool,
    sentence_type: Option<DeviceKind>,
    error_devices: HashSet<DeviceId>,
    device_holder: DeviceHolder,
    connection_holder: ConnectionHolder,
    monitor_targets_in_statement: usize,
}

impl State {
    fn set_new_line_word(&mut self) {
        self.new_line = true;
        self.expect = match self.phase {
            Phase::Init => Expect::DeviceName,
            Phase::Connect => Expect::ConnectSource,
            Phase::Monitor => Expect::MonitorKeyword,
        };
    }

    fn increment_phase(&mut self) {
        self.phase = match self.phase {
            Phase::Init => Phase::Connect,
            Phase::Connect => Phase::Monitor,
            Phase::Monitor => Phase::Monitor,
        };
        self.new_line = false;
        self.expect = Expect::Semicolon;
    }
}

/// The outcome of compiling one source file: whether it succeeded, and every diagnostic
/// produced along the way.
#[derive(Debug, Default)]
pub struct ParseOutcome {
    pub success: bool,
    pub errors: ErrorLog,
}

/// Runs the three-phase grammar over `source`, populating `network` (devices + wiring) and
/// `monitors` as it goes, interning names into `names`.
pub fn parse(source: String, names: &mut Names, network: &mut Network, monitors: &mut Monitors) -> ParseOutcome {
    let mut scanner = Scanner::from_source(source);
    let mut errors = ErrorLog::new();

    if check_structure(&mut scanner, names, &mut errors).is_err() {
        return ParseOutcome { success: false, errors };
    }

    // `check_structure` leaves the scanner at the start of the file; the leading `INIT`
    // keyword is known to be present (checked above) and is consumed here without being
    // fed through the main state machine, which starts expecting the semicolon that
    // terminates the `INIT;` header.
    scanner.restart();
    let _ = scanner.get_symbol(names);

    let mut state = State {
        phase: Phase::Init,
        expect: Expect::Semicolon,
        new_line: false,
        sentence_type: None,
        error_devices: HashSet::new(),
        device_holder: DeviceHolder::default(),
        connection_holder: ConnectionHolder::default(),
        monitor_targets_in_statement: 0,
    };

    loop {
        let token = scanner.get_symbol(names);

        if token.kind == TokenKind::Eof {
            if state.phase == Phase::Monitor && state.expect != Expect::MonitorKeyword {
                syntax_err(&mut errors, &scanner, &token, SyntaxError::MissTermination, CaretAnchor::EndOfToken, None);
            }
            break;
        }

        if token.kind == TokenKind::Error {
            if state.phase == Phase::Init && state.expect == Expect::DeviceName {
                syntax_err(&mut errors, &scanner, &token, SyntaxError::InitWrongName, CaretAnchor::StartOfToken, None);
            } else {
                syntax_err(&mut errors, &scanner, &token, SyntaxError::KeywordNotFound, CaretAnchor::StartOfToken, None);
            }
            recover(&mut scanner, names, &mut state);
            continue;
        }

        if state.expect == Expect::Semicolon {
            parse_semicolon(&mut scanner, names, network, monitors, &mut errors, &mut state, &token);
            continue;
        }

        if !state.expect.matches(token.kind) {
            match handle_mismatch(&mut scanner, names, &mut errors, &mut state, &token) {
                Flow::Break => break,
                Flow::Continue => continue,
                Flow::FallThrough => {}
            }
        }

        match state.phase {
            Phase::Init => parse_init(&mut scanner, names, &mut errors, &mut state, &token),
            Phase::Connect => parse_connect(&mut scanner, names, network, &mut errors, &mut state, &token),
            Phase::Monitor => parse_monitor(&scanner, network, monitors, &mut errors, &mut state, &token),
        }
    }

    if !errors.is_clean() {
        return ParseOutcome { success: false, errors };
    }

    // Whole-circuit checks have no natural current token to point at, so (mirroring the
    // reference parser's behaviour of repositioning to the top of the file for these two
    // diagnostics) the pointer anchors on line 1.
    if !network.check_network() {
        let pointer = format!("{}\n^", scanner.line_text_at(0));
        errors.record_semantic(SemanticError::UnusedInputs, 1, pointer, None);
        return ParseOutcome { success: false, errors };
    }

    if !network.execute_network() {
        let pointer = format!("{}\n^", scanner.line_text_at(0));
        errors.record_semantic(SemanticError::Oscillate, 1, pointer, None);
        return ParseOutcome { success: false, errors };
    }

    ParseOutcome { success: true, errors }
}

enum Flow {
    Continue,
    Break,
    FallThrough,
}

fn handle_mismatch(
    scanner: &mut Scanner,
    names: &mut Names,
    errors: &mut ErrorLog,
    state: &mut State,
    token: &Token,
) -> Flow {
    if state.new_line {
        match state.phase {
            Phase::Init => {
                if token.kind == TokenKind::Connect {
                    state.increment_phase();
                    return Flow::Continue;
                }
                syntax_err(errors, scanner, token, SyntaxError::InitWrongName, CaretAnchor::StartOfToken, None);
                recover(scanner, names, state);
                Flow::Continue
            }
            Phase::Connect => {
                if token.kind == TokenKind::Monitor {
                    state.increment_phase();
                    return Flow::Continue;
                }
                syntax_err(errors, scanner, token, SyntaxError::ConnectWrongIo, CaretAnchor::StartOfToken, None);
                recover(scanner, names, state);
                Flow::Continue
            }
            Phase::Monitor => {
                syntax_err(errors, scanner, token, SyntaxError::MonitorMissKeyword, CaretAnchor::StartOfToken, None);
                recover(scanner, names, state);
                Flow::Continue
            }
        }
    } else {
        match state.phase {
            Phase::Init => {
                if state.expect == Expect::Number {
                    syntax_err(errors, scanner, token, SyntaxError::InitWrongSet, CaretAnchor::StartOfToken, None);
                } else {
                    syntax_err(errors, scanner, token, SyntaxError::InitMissKeyword, CaretAnchor::StartOfToken, None);
                }
                recover(scanner, names, state);
                Flow::Continue
            }
            Phase::Connect => {
                if state.expect == Expect::DeviceIn {
                    syntax_err(errors, scanner, token, SyntaxError::ConnectWrongIo, CaretAnchor::StartOfToken, None);
                } else {
                    syntax_err(errors, scanner, token, SyntaxError::ConnectMissKeyword, CaretAnchor::StartOfToken, None);
                }
                recover(scanner, names, state);
                Flow::Continue
            }
            Phase::Monitor => {
                syntax_err(errors, scanner, token, SyntaxError::MonitorWrongPoint, CaretAnchor::StartOfToken, None);
                recover(scanner, names, state);
                Flow::Continue
            }
        }
    }
}

/// Skips tokens until the next statement terminator or section keyword, then resumes with a
/// fresh accumulator — the recovery contract described in the module design docs.
fn recover(scanner: &mut Scanner, names: &mut Names, state: &mut State) {
    loop {
        let token = scanner.get_symbol(names);
        match (state.phase, token.kind) {
            (_, TokenKind::Semicolon) => break,
            (_, TokenKind::Eof) => break,
            (Phase::Init, TokenKind::Connect) => {
                state.increment_phase();
                state.device_holder = DeviceHolder::default();
                state.connection_holder = ConnectionHolder::default();
                return;
            }
            (Phase::Connect, TokenKind::Monitor) => {
                state.increment_phase();
                state.device_holder = DeviceHolder::default();
                state.connection_holder = ConnectionHolder::default();
                return;
            }
            _ => continue,
        }
    }
    state.device_holder = DeviceHolder::default();
    state.connection_holder = ConnectionHolder::default();
    state.monitor_targets_in_statement = 0;
    state.set_new_line_word();
}

fn parse_semicolon(
    scanner: &mut Scanner,
    names: &mut Names,
    network: &mut Network,
    monitors: &mut Monitors,
    errors: &mut ErrorLog,
    state: &mut State,
    token: &Token,
) {
    if token.kind != TokenKind::Semicolon {
        syntax_err(errors, scanner, token, SyntaxError::MissTermination, CaretAnchor::StartOfToken, None);
        recover(scanner, names, state);
        return;
    }

    match state.phase {
        Phase::Init => {
            if let (Some(id), Some(kind)) = (state.device_holder.device_id, state.device_holder.device_kind) {
                let qualifier = state.device_holder.qualifier.clone().unwrap_or(Qualifier::Absent);
                if let Err(err) = network.devices.make_device(id, kind, qualifier) {
                    semantic_err(errors, scanner, token, err, CaretAnchor::EndOfToken, None);
                }
            }
            state.device_holder = DeviceHolder::default();
        }
        Phase::Connect => {
            if let (Some(first), Some(second)) = (state.connection_holder.first, state.connection_holder.second) {
                if let Err(err) = network.make_connection(first.0, first.1, second.0, second.1) {
                    semantic_err(errors, scanner, token, err, CaretAnchor::EndOfToken, None);
                }
            }
            state.connection_holder = ConnectionHolder::default();
        }
        Phase::Monitor => {
            let _ = monitors;
        }
    }
    state.set_new_line_word();
}

fn parse_init(scanner: &mut Scanner, names: &mut Names, errors: &mut ErrorLog, state: &mut State, token: &Token) {
    if state.new_line {
        // Duplicate declarations are left to `Devices::make_device`'s own `DevicePresent`
        // check at the statement's closing semicolon, so they are reported exactly once.
        let id = token.name_id.expect("DeviceName token always carries a name id");
        state.device_holder.device_id = Some(id);
        state.expect = Expect::InitIs;
        state.new_line = false;
        return;
    }

    match token.kind {
        TokenKind::InitIs => state.expect = Expect::DeviceType,
        TokenKind::DeviceType => {
            let kind = token.device_kind.expect("DeviceType token always carries a kind");
            state.sentence_type = Some(kind);
            state.device_holder.device_kind = Some(kind);
            state.expect = match kind {
                DeviceKind::Xor | DeviceKind::Dtype => Expect::Semicolon,
                DeviceKind::Switch => Expect::InitSwitch,
                DeviceKind::And | DeviceKind::Nand | DeviceKind::Or | DeviceKind::Nor => Expect::InitWith,
                DeviceKind::Clock | DeviceKind::Rc => Expect::InitClk,
                DeviceKind::Siggen => Expect::InitWith,
            };
        }
        TokenKind::InitSwitch | TokenKind::InitClk => state.expect = Expect::Number,
        TokenKind::InitWith => {
            state.expect = if state.sentence_type == Some(DeviceKind::Siggen) { Expect::SiggenWave } else { Expect::Number };
        }
        TokenKind::Number => match state.sentence_type {
            Some(DeviceKind::Switch) => {
                if token.text == "0" || token.text == "1" {
                    state.device_holder.qualifier = Some(Qualifier::SwitchInitial(token.text == "1"));
                    state.expect = Expect::Semicolon;
                } else {
                    syntax_err(errors, scanner, token, SyntaxError::InitWrongSet, CaretAnchor::StartOfToken, None);
                    if let Some(id) = state.device_holder.device_id {
                        state.error_devices.insert(id);
                    }
                    recover(scanner, names, state);
                }
            }
            Some(DeviceKind::And | DeviceKind::Nand | DeviceKind::Or | DeviceKind::Nor) => {
                match token.text.parse::<u32>() {
                    Ok(n) if (1..=16).contains(&n) => {
                        state.device_holder.qualifier = Some(Qualifier::GateInputs(n as u8));
                        state.expect = Expect::InitGate;
                    }
                    _ => {
                        semantic_err(errors, scanner, token, SemanticError::InvalidQualifier, CaretAnchor::StartOfToken, None);
                        if let Some(id) = state.device_holder.device_id {
                            state.error_devices.insert(id);
                        }
                        recover(scanner, names, state);
                    }
                }
            }
            Some(DeviceKind::Clock | DeviceKind::Rc) => match token.text.parse::<u32>() {
                Ok(n) if n > 0 => {
                    state.device_holder.qualifier = Some(Qualifier::Period(n));
                    state.expect = Expect::Semicolon;
                }
                _ => {
                    semantic_err(errors, scanner, token, SemanticError::InvalidQualifier, CaretAnchor::StartOfToken, None);
                    if let Some(id) = state.device_holder.device_id {
                        state.error_devices.insert(id);
                    }
                    recover(scanner, names, state);
                }
            },
            _ => {}
        },
        TokenKind::SiggenWave => {
            let bits = token.text.chars().map(|c| c == '1').collect::<Vec<_>>();
            state.device_holder.qualifier = Some(Qualifier::Pattern(bits));
            state.expect = Expect::Semicolon;
        }
        TokenKind::InitGate => state.expect = Expect::Semicolon,
        _ => {}
    }
}

fn resolve_source_endpoint(token: &Token) -> (DeviceId, Option<PortRef>) {
    let id = token.name_id.expect("DeviceName/DeviceOut token always carries a name id");
    let port = match token.kind {
        TokenKind::DeviceOut => {
            let text = token.port_text.as_deref().unwrap_or("");
            OutputPort::from_str(text).map(PortRef::Out)
        }
        _ => None,
    };
    (id, port)
}

fn parse_connect(
    scanner: &mut Scanner,
    names: &mut Names,
    network: &mut Network,
    errors: &mut ErrorLog,
    state: &mut State,
    token: &Token,
) {
    if state.new_line {
        let (id, port) = resolve_source_endpoint(token);
        if !network.devices.contains(id) {
            if !state.error_devices.contains(&id) {
                semantic_err(errors, scanner, token, SemanticError::DeviceAbsent, CaretAnchor::StartOfToken, None);
            }
            state.expect = Expect::ConnectSource;
            recover(scanner, names, state);
            return;
        }
        state.connection_holder.first = Some((id, port));
        state.expect = Expect::Connection;
        state.new_line = false;
        return;
    }

    match token.kind {
        TokenKind::Connection => state.expect = Expect::DeviceIn,
        TokenKind::DeviceIn => {
            state.expect = Expect::Semicolon;
            let id = token.name_id.expect("DeviceIn token always carries a name id");
            let port_text = token.port_text.as_deref().unwrap_or("");
            let Some(input_port) = InputPort::from_str(port_text) else {
                semantic_err(errors, scanner, token, SemanticError::PortAbsent, CaretAnchor::StartOfToken, None);
                state.connection_holder = ConnectionHolder::default();
                return;
            };
            if !network.devices.contains(id) {
                semantic_err(errors, scanner, token, SemanticError::DeviceAbsent, CaretAnchor::StartOfToken, None);
                state.connection_holder = ConnectionHolder::default();
                return;
            }
            let dst_kind = network.devices.get(id).map(|d| d.kind);
            if let Some((first_id, _)) = state.connection_holder.first {
                let src_kind = network.devices.get(first_id).map(|d| d.kind);
                if dst_kind == Some(DeviceKind::Dtype)
                    && input_port == InputPort::Clk
                    && src_kind != Some(DeviceKind::Clock)
                {
                    semantic_err(errors, scanner, token, SemanticError::NotClockToClk, CaretAnchor::EndOfToken, None);
                    state.connection_holder = ConnectionHolder::default();
                    return;
                }
                if src_kind == Some(DeviceKind::Rc)
                    && !(dst_kind == Some(DeviceKind::Dtype) && matches!(input_port, InputPort::Set | InputPort::Clear))
                {
                    semantic_err(errors, scanner, token, SemanticError::NotRcToDType, CaretAnchor::EndOfToken, None);
                    state.connection_holder = ConnectionHolder::default();
                    return;
                }
            }
            state.connection_holder.second = Some((id, Some(PortRef::In(input_port))));
        }
        _ => {}
    }
}

fn parse_monitor(
    scanner: &Scanner,
    network: &Network,
    monitors: &mut Monitors,
    errors: &mut ErrorLog,
    state: &mut State,
    token: &Token,
) {
    if token.kind == TokenKind::InitMonitor {
        state.expect = Expect::MonitorBody;
        state.new_line = false;
        state.monitor_targets_in_statement = 0;
        return;
    }

    if token.kind == TokenKind::Semicolon {
        if state.monitor_targets_in_statement == 0 {
            syntax_err(errors, scanner, token, SyntaxError::MonitorWrongPoint, CaretAnchor::StartOfToken, None);
        }
        state.monitor_targets_in_statement = 0;
        state.set_new_line_word();
        return;
    }

    let (id, port) = resolve_source_endpoint(token);
    state.monitor_targets_in_statement += 1;
    let out_port = match port {
        Some(PortRef::Out(p)) => p,
        Some(PortRef::In(_)) => {
            semantic_err(errors, scanner, token, SemanticError::NotOutput, CaretAnchor::StartOfToken, None);
            return;
        }
        None => OutputPort::Out,
    };
    if let Err(err) = monitors.make_monitor(&network.devices, id, out_port, 0) {
        semantic_err(errors, scanner, token, err, CaretAnchor::StartOfToken, None);
    }
}

/// Confirms the three section keywords appear in order with a plausible number of tokens in
/// each section, without attempting recovery. Leaves the scanner positioned at the start of
/// the file on return (success or failure).
fn check_structure(scanner: &mut Scanner, names: &mut Names, errors: &mut ErrorLog) -> Result<(), ()> {
    scanner.restart();
    let mut idx = 0usize;
    let first = scanner.get_symbol(names);
    idx += 1;
    let init_pos = (first.kind == TokenKind::Init).then_some(idx);

    let mut connect_pos = None;
    let mut monitor_pos = None;
    let mut last_idx = idx;
    loop {
        let token = scanner.get_symbol(names);
        idx += 1;
        last_idx = idx;
        if token.kind == TokenKind::Eof {
            break;
        }
        if token.kind == TokenKind::Connect && connect_pos.is_none() {
            connect_pos = Some(idx);
        }
        if token.kind == TokenKind::Monitor && monitor_pos.is_none() {
            monitor_pos = Some(idx);
        }
    }

    if scanner.had_invalid_comment() {
        let pointer = format!("{}\n^", scanner.line_text_at(0));
        errors.record_syntax(SyntaxError::InvalidComment, 1, pointer, None);
    }

    let mut ok = true;
    if init_pos.is_none() {
        record_structural(errors, scanner, SyntaxError::MissStartMark, "INIT");
        ok = false;
    }
    if connect_pos.is_none() {
        record_structural(errors, scanner, SyntaxError::MissStartMark, "CONNECT");
        ok = false;
    }
    if let (Some(i), Some(c)) = (init_pos, connect_pos) {
        if c - i < 2 {
            record_structural(errors, scanner, SyntaxError::MissDescription, "for INIT");
            ok = false;
        }
    }
    if let Some(c) = connect_pos {
        let enough = match monitor_pos {
            None => last_idx - c >= 4,
            Some(m) => m - c >= 3,
        };
        if !enough {
            record_structural(errors, scanner, SyntaxError::MissDescription, "for CONNECT");
            ok = false;
        }
    }
    if let Some(m) = monitor_pos {
        if last_idx - m < 4 {
            record_structural(errors, scanner, SyntaxError::MissDescription, "for MONITOR");
            ok = false;
        }
    }

    scanner.restart();
    if ok {
        Ok(())
    } else {
        Err(())
    }
}

fn record_structural(errors: &mut ErrorLog, scanner: &Scanner, error: SyntaxError, detail: &str) {
    let pointer = format!("{}\n^", scanner.line_text_at(0));
    errors.record_syntax(error, 1, pointer, Some(detail.to_string()));
}

fn syntax_err(errors: &mut ErrorLog, scanner: &Scanner, token: &Token, error: SyntaxError, anchor: CaretAnchor, detail: Option<&str>) {
    let line = scanner.line_number_at(token.start);
    let pointer = scanner.pointer_block(token, anchor);
    errors.record_syntax(error, line, pointer, detail.map(str::to_string));
}

fn semantic_err(
    errors: &mut ErrorLog,
    scanner: &Scanner,
    token: &Token,
    error: SemanticError,
    anchor: CaretAnchor,
    detail: Option<&str>,
) {
    let line = scanner.line_number_at(token.start);
    let pointer = scanner.pointer_block(token, anchor);
    errors.record_semantic(error, line, pointer, detail.map(str::to_string));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::SignalLevel;

    fn compile(source: &str) -> (ParseOutcome, Names, Network, Monitors) {
        let mut names = Names::new();
        let mut network = Network::new(1000);
        let mut monitors = Monitors::new();
        let outcome = parse(source.to_string(), &mut names, &mut network, &mut monitors);
        (outcome, names, network, monitors)
    }

    #[test]
    fn well_formed_and_gate_compiles() {
        let source = "\
INIT;
SW1 is SWITCH initially_at 1;
SW2 is SWITCH initially_at 0;
A1 is AND with 2 inputs;
CONNECT;
SW1 connect_to A1.I1;
SW2 connect_to A1.I2;
MONITOR;
Initial_monitor_at A1;
";
        let (outcome, names, mut network, mut monitors) = compile(source);
        assert!(outcome.success, "{:?}", outcome.errors.diagnostics());
        network.devices.cold_startup();
        for _ in 0..3 {
            assert!(network.execute_network());
            monitors.record_signals(&network.devices);
        }
        let a1 = names.query("A1").unwrap();
        let history: Vec<_> = monitors.history(a1, OutputPort::Out).unwrap().to_vec();
        assert_eq!(history, vec![SignalLevel::Low, SignalLevel::Low, SignalLevel::Low]);
    }

    #[test]
    fn missing_connect_section_reports_miss_start_mark() {
        let source = "INIT; SW1 is SWITCH initially_at 1; MONITOR; Initial_monitor_at SW1;";
        let (outcome, ..) = compile(source);
        assert!(!outcome.success);
        assert!(outcome
            .errors
            .diagnostics()
            .iter()
            .any(|d| d.message.contains("Missing start mark")));
    }

    #[test]
    fn oscillator_reports_oscillate_and_fails() {
        let source = "INIT; N1 is NAND with 1 inputs; CONNECT; N1 connect_to N1.I1;";
        let (outcome, ..) = compile(source);
        assert!(!outcome.success);
        assert!(outcome
            .errors
            .diagnostics()
            .iter()
            .any(|d| matches!(d.message.as_str(), m if m.contains("oscillates"))));
    }

    #[test]
    fn unused_input_is_reported() {
        let source = "INIT; A1 is AND with 2 inputs; SW1 is SWITCH initially_at 1; CONNECT; SW1 connect_to A1.I1;";
        let (outcome, ..) = compile(source);
        assert!(!outcome.success);
        assert!(outcome
            .errors
            .diagnostics()
            .iter()
            .any(|d| d.message.contains("unused inputs")));
    }

    #[test]
    fn clk_not_driven_by_clock_is_reported() {
        let source = "\
INIT;
SW1 is SWITCH initially_at 0;
D1 is DTYPE;
CONNECT;
SW1 connect_to D1.CLK;
SW1 connect_to D1.DATA;
SW1 connect_to D1.SET;
SW1 connect_to D1.CLEAR;
";
        let (outcome, ..) = compile(source);
        assert!(outcome
            .errors
            .diagnostics()
            .iter()
            .any(|d| d.message.contains("not connected to CLOCK")));
    }

    #[test]
    fn gate_qualifier_out_of_range_is_a_semantic_error() {
        let source = "INIT; A1 is AND with 17 inputs; SW1 is SWITCH initially_at 1; CONNECT; SW1 connect_to A1.I1;";
        let (outcome, ..) = compile(source);
        assert!(!outcome.success);
        assert!(outcome
            .errors
            .diagnostics()
            .iter()
            .any(|d| d.message.contains("wrong property")));
    }

    #[test]
    fn switch_qualifier_must_be_zero_or_one() {
        let source = "INIT; SW1 is SWITCH initially_at 2; A1 is AND with 1 inputs; CONNECT; SW1 connect_to A1.I1;";
        let (outcome, ..) = compile(source);
        assert!(!outcome.success);
        assert!(outcome
            .errors
            .diagnostics()
            .iter()
            .any(|d| d.message.contains("Invalid setting")));
    }

    #[test]
    fn duplicate_device_name_reports_device_present_once() {
        let source = "\
INIT;
SW1 is SWITCH initially_at 1;
SW1 is SWITCH initially_at 0;
A1 is AND with 1 inputs;
CONNECT;
SW1 connect_to A1.I1;
";
        let (outcome, ..) = compile(source);
        assert!(!outcome.success);
        let count = outcome
            .errors
            .diagnostics()
            .iter()
            .filter(|d| d.message.contains("initialised twice"))
            .count();
        assert_eq!(count, 1);
    }

    #[test]
    fn unterminated_comment_is_reported() {
        let source = "INIT; /* never closes";
        let (outcome, ..) = compile(source);
        assert!(!outcome.success);
        assert!(outcome
            .errors
            .diagnostics()
            .iter()
            .any(|d| d.message.contains("end comment mark")));
    }

    #[test]
    fn dtype_clocked_circuit_compiles_and_toggles_q() {
        let source = "\
INIT;
SW1 is SWITCH initially_at 1;
CK1 is CLOCK with_simulation_cycles 2;
D1 is DTYPE;
CONNECT;
SW1 connect_to D1.DATA;
CK1 connect_to D1.CLK;
SW1 connect_to D1.SET;
SW1 connect_to D1.CLEAR;
";
        let (outcome, ..) = compile(source);
        assert!(outcome.success, "{:?}", outcome.errors.diagnostics());
    }
}
