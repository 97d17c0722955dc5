//! Integration tests for FormattingEngine
//!
//! Each test builds an engine over a JSON states object and checks the
//! rendered text of one or more templates.

use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use bindfmt::{
    unescape, Binding, BindingParser, CalendarLocale, DateZone, EngineConfig, FormatRequest,
    FormattingEngine, FormulaLimits, MomentCalendar, TokenParser, Widget,
};
use bindfmt::date::FixedClock;
use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use serde_json::{json, Value as Json};

fn utc_config() -> EngineConfig {
    EngineConfig {
        user: "alice".to_string(),
        utc_offset_minutes: Some(0),
        ..EngineConfig::default()
    }
}

fn engine_with(config: &EngineConfig, states: Json) -> FormattingEngine {
    let Json::Object(map) = states else {
        panic!("states must be an object");
    };
    FormattingEngine::new(config, Arc::new(map)).unwrap()
}

fn engine(states: Json) -> FormattingEngine {
    engine_with(&utc_config(), states)
}

fn render(engine: &FormattingEngine, template: &str) -> String {
    engine.format(template, &FormatRequest::new("main", "w00001"))
}

/// Parser that counts how often the engine asks it to parse
struct CountingParser {
    calls: Arc<AtomicUsize>,
}

impl BindingParser for CountingParser {
    fn parse(&self, template: &str) -> Option<Vec<Binding>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        TokenParser::default().parse(template)
    }
}

#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl io::Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Run `f` with a subscriber that records WARN and above
fn capture_logs(f: impl FnOnce()) -> String {
    let captured = Captured::default();
    let writer = captured.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::WARN)
        .finish();
    tracing::subscriber::with_default(subscriber, f);
    let bytes = captured.0.lock().unwrap().clone();
    String::from_utf8(bytes).unwrap()
}

// ============================================================================
// Substitution basics
// ============================================================================

#[test]
fn test_templates_without_bindings_are_only_unescaped() {
    let engine = engine(json!({}));
    for template in ["plain text", "{{literal}}", "a }} b {{", "{\"json\": 1}", ""] {
        assert_eq!(render(&engine, template), unescape(template));
    }
    assert_eq!(render(&engine, "{{literal}}"), "{literal}");
}

#[test]
fn test_missing_state_renders_undefined() {
    let engine = engine(json!({}));
    assert_eq!(render(&engine, "[{nothing.here}]"), "[undefined]");
}

#[test]
fn test_escaped_braces_next_to_bindings() {
    let engine = engine(json!({"a.val": 5}));
    assert_eq!(render(&engine, "{{b}} = {a}"), "{b} = 5");
}

#[test]
fn test_state_types_render_as_text() {
    let engine = engine(json!({
        "s.val": "on",
        "b.val": false,
        "n.val": null,
        "list.val": [1, null, "x"],
    }));
    assert_eq!(render(&engine, "{s}|{b}|{n}|{list}"), "on|false|null|1,,x");
}

// ============================================================================
// Operators
// ============================================================================

#[test]
fn test_value_operator_groups_thousands() {
    let engine = engine(json!({"p.val": 1234.5}));
    assert_eq!(render(&engine, "{p;value(2)}"), "1,234.50");
    assert_eq!(render(&engine, "{p;value}"), "1,234.50");
    assert_eq!(render(&engine, "{p;value(1,.)}"), "1.234,5");
}

#[test]
fn test_value_operator_caps_decimal_count() {
    let engine = engine(json!({"x.val": 1.5}));
    let out = render(&engine, "{x;value(18446744073709551615)}");
    assert_eq!(out.len(), 102);
    assert!(out.starts_with("1.50"), "{}", out);
    assert_eq!(render(&engine, "{x;value(5000000)}"), out);
}

#[test]
fn test_round() {
    let engine = engine(json!({"a.val": 2.6, "b.val": 2.55}));
    assert_eq!(render(&engine, "{a;round}"), "3");
    assert_eq!(render(&engine, "{b;round(1)}"), "2.6");
}

#[test]
fn test_round_is_exact_near_half_and_beyond_2_pow_52() {
    let engine = engine(json!({
        "h.val": 0.49999999999999994,
        "big.val": 4503599627370497_i64,
    }));
    assert_eq!(render(&engine, "{h;round}"), "0");
    assert_eq!(render(&engine, "{big;round}"), "4503599627370497");
    assert_eq!(render(&engine, "{big;hex}"), "10000000000001");
}

#[test]
fn test_hex_padding_and_case() {
    let engine = engine(json!({"five.val": 5, "max.val": 255}));
    assert_eq!(render(&engine, "{five;hex2}"), "05");
    assert_eq!(render(&engine, "{max;HEX2}"), "FF");
    assert_eq!(render(&engine, "{max;hex}"), "ff");
}

#[test]
fn test_min_is_a_floor_and_max_a_ceiling() {
    let engine = engine(json!({"low.val": 5, "high.val": 15}));
    assert_eq!(render(&engine, "{low;min(10)}"), "10");
    assert_eq!(render(&engine, "{high;max(10)}"), "10");
    assert_eq!(render(&engine, "{high;min(10)}"), "15");
}

#[test]
fn test_arithmetic_chain() {
    let engine = engine(json!({"p.val": "1234 W"}));
    assert_eq!(render(&engine, "{p;/(1000);round(2)} kW"), "1.23 kW");
    assert_eq!(render(&engine, "{p;*(0,5)}"), "617");
    assert_eq!(render(&engine, "{p;-(34);%(1000)}"), "200");
    assert_eq!(render(&engine, "{p;/(2);pow}"), "380689");
}

#[test]
fn test_dropped_operator_leaves_value() {
    let engine = engine(json!({"a.val": 3}));
    assert_eq!(render(&engine, "{a;*(abc)}"), "3");
}

#[test]
fn test_array_lookup() {
    let engine = engine(json!({"on.val": true, "mode.val": "2", "big.val": 7}));
    assert_eq!(render(&engine, "{on;array(off,on)}"), "on");
    assert_eq!(render(&engine, "{mode;array(auto, heat, cool)}"), "cool");
    assert_eq!(render(&engine, "{big;array(a,b)}"), "undefined");
}

#[test]
fn test_json_operator() {
    let engine = engine(json!({
        "cfg.val": "{\"rooms\": [{\"name\": \"hall\"}, {\"name\": \"kitchen\"}]}",
        "bad.val": "nope",
    }));
    assert_eq!(render(&engine, "{cfg;json(rooms[1].name)}"), "kitchen");
    assert_eq!(render(&engine, "{cfg;json(rooms.5)}"), "undefined");
    assert_eq!(render(&engine, "{bad;json(a)}"), "nope");
}

#[test]
fn test_floor_ceil_sqrt() {
    let engine = engine(json!({"a.val": 2.5, "sq.val": 81}));
    assert_eq!(render(&engine, "{a;floor}/{a;ceil}/{sq;sqrt}"), "2/3/9");
}

#[test]
fn test_random_is_in_range() {
    let engine = engine(json!({"x.val": 0}));
    for _ in 0..20 {
        let n: f64 = render(&engine, "{x;random(10)}").parse().unwrap();
        assert!((0.0..10.0).contains(&n));
    }
}

#[test]
fn test_unknown_operator_warns_and_keeps_value() {
    let engine = engine(json!({"x.val": 1}));
    let mut out = String::new();
    let logs = capture_logs(|| out = render(&engine, "{x;blink;+(1)}"));

    assert_eq!(out, "2");
    assert!(logs.contains("unknown binding operator"), "logs: {}", logs);
    assert!(logs.contains("blink"), "logs: {}", logs);
}

// ============================================================================
// Dates
// ============================================================================

#[test]
fn test_date_epoch_seconds_utc() {
    let engine = engine(json!({"t.val": 946684800}));
    assert_eq!(render(&engine, "{t;date(YYYY-MM-DD)}"), "2000-01-01");
}

#[test]
fn test_date_default_pattern() {
    let config = EngineConfig {
        date_format: "YYYY/MM/DD".to_string(),
        ..utc_config()
    };
    let engine = engine_with(&config, json!({"t.val": 946684800000_i64}));
    assert_eq!(render(&engine, "{t;date}"), "2000/01/01");
}

#[test]
fn test_duration_shift_applies_once() {
    let config = EngineConfig {
        utc_offset_minutes: Some(120),
        ..EngineConfig::default()
    };
    let engine = engine_with(&config, json!({"d.val": 100, "run.val": 3661}));
    assert_eq!(render(&engine, "{d;date(hh:mm:ss)}"), "00:01:40");
    assert_eq!(render(&engine, "{run;date(hh:mm:ss)}"), "01:01:01");
}

#[test]
fn test_timestamp_channel_is_never_a_duration() {
    let engine = engine(json!({"door.lc": 100}));
    // epoch seconds, not elapsed time
    assert_eq!(render(&engine, "{door.lc;date(YYYY hh:mm:ss)}"), "1970 00:01:40");
}

fn moment_engine(translate: fn(&str) -> String) -> FormattingEngine {
    let now = Utc.with_ymd_and_hms(2024, 3, 5, 18, 0, 0).unwrap();
    let calendar = MomentCalendar::new(CalendarLocale::En, DateZone::utc())
        .with_clock(Arc::new(FixedClock(now)));
    engine(json!({
        "today.lc": 1709632800000_i64,
        "yesterday.lc": 1709546400000_i64,
        "older.lc": 1709287200000_i64,
    }))
    .with_calendar(Arc::new(calendar))
    .with_translator(translate)
}

#[test]
fn test_moment_date_today_and_yesterday() {
    let engine = moment_engine(|text| match text {
        "Today" => "Heute".to_string(),
        other => other.to_string(),
    });
    assert_eq!(render(&engine, "{today.lc;momentDate(dddd HH:mm,true)}"), "Heute 10:00");
    assert_eq!(
        render(&engine, "{yesterday.lc;momentDate(dddd HH:mm,true)}"),
        "Yesterday 10:00"
    );
    assert_eq!(render(&engine, "{older.lc;momentDate(dddd HH:mm,true)}"), "Friday 10:00");
    assert_eq!(render(&engine, "{today.lc;momentDate(dddd HH:mm)}"), "Tuesday 10:00");
}

#[test]
fn test_moment_date_argument_count() {
    let engine = moment_engine(|text| text.to_string());
    assert_eq!(render(&engine, "{today.lc;momentDate(a,b,c)}"), "error");
    assert_eq!(render(&engine, "{today.lc;momentDate}"), "05.03.2024");
}

#[test]
fn test_moment_date_localized_formats() {
    let engine = moment_engine(|text| text.to_string());
    assert_eq!(render(&engine, "{today.lc;momentDate(LT)}"), "10:00 AM");
    assert_eq!(render(&engine, "{today.lc;momentDate(L LT)}"), "03/05/2024 10:00 AM");
}

#[test]
fn test_moment_date_without_calendar_is_unchanged() {
    let engine = engine(json!({"t.val": 1709632800000_i64}));
    let mut out = String::new();
    let logs = capture_logs(|| out = render(&engine, "{t;momentDate(LT)}"));
    assert_eq!(out, "1709632800000");
    assert!(logs.contains("momentDate"), "logs: {}", logs);
}

#[test]
fn test_request_calendar_overrides_engine_default() {
    let engine = engine(json!({"t.val": 1709632800000_i64}));
    let calendar = MomentCalendar::new(CalendarLocale::De, DateZone::utc());
    let request = FormatRequest::new("main", "w1").with_calendar(&calendar);
    assert_eq!(engine.format("{t;momentDate(dddd)}", &request), "Dienstag");
}

// ============================================================================
// Formulas
// ============================================================================

#[test]
fn test_formula_with_named_arguments() {
    let engine = engine(json!({"hall.h.val": 5, "hall.w.val": 8, "big.val": 30}));
    assert_eq!(render(&engine, "{h:hall.h;w:hall.w;Math.max(20, h + w)}"), "20");
    assert_eq!(render(&engine, "{h:big;w:hall.w;Math.max(20, h + w)}"), "38");
}

#[test]
fn test_formula_conditional_text() {
    let engine = engine(json!({"light.on.val": true, "light.level.val": "40"}));
    let template = "Light {s:light.on;l:light.level;s ? 'on (' + l + '%)' : 'off'}";
    assert_eq!(render(&engine, template), "Light on (40%)");
}

#[test]
fn test_formula_json_arguments_are_structured() {
    let engine = engine(json!({"cfg.val": "{\"list\": [1, 2], \"name\": \"x\"}"}));
    assert_eq!(render(&engine, "{c:cfg;c.name.toUpperCase()}"), "X");
    assert_eq!(render(&engine, "{c:cfg;c.list}"), "[1,2]");
}

#[test]
fn test_formula_special_values() {
    let engine = engine(json!({}));
    assert_eq!(render(&engine, "{u:username;'hi ' + u}"), "hi alice");
}

#[test]
fn test_formula_widget_access() {
    let engine = engine(json!({"pump.power.val": 21}));
    let data = json!({"name": "Pump", "oid": "pump.power"});
    let data = data.as_object().unwrap();
    let request = FormatRequest::new("main", "w1").with_widget_data(data);

    assert_eq!(engine.format("{;widget.data.name}", &request), "Pump");
    assert_eq!(engine.format("{v:widgetOid.val;v * 2}", &request), "42");
}

#[test]
fn test_formula_failure_yields_zero_and_logs() {
    let engine = engine(json!({}));
    let mut out = String::new();
    let logs = capture_logs(|| out = render(&engine, "{a:missing;a.b.c}"));

    assert_eq!(out, "0");
    assert!(logs.contains("formula evaluation failed"), "logs: {}", logs);
    assert!(logs.contains("return a.b.c;"), "logs: {}", logs);
}

#[test]
fn test_formula_step_budget_yields_zero() {
    let config = EngineConfig {
        formula: FormulaLimits {
            max_steps: 10,
            max_depth: 64,
        },
        ..utc_config()
    };
    let engine = engine_with(&config, json!({"x.val": 1}));
    let formula = vec!["a"; 30].join(" + ");
    assert_eq!(render(&engine, &format!("{{a:x;{}}}", formula)), "0");
    assert_eq!(render(&engine, "{a:x;a + 1}"), "2");
}

#[test]
fn test_formula_followed_by_second_formula() {
    let engine = engine(json!({"x.val": 4}));
    assert_eq!(render(&engine, "{a:x;a * 2;a + 1}"), "5");
}

// ============================================================================
// Context
// ============================================================================

#[test]
fn test_special_values() {
    let config = EngineConfig {
        instance: 7,
        language: "de".to_string(),
        ..utc_config()
    };
    let engine = engine_with(&config, json!({"username.val": "ignored"}));
    let widget = Widget {
        data: json!({"name": "Heating"}).as_object().cloned().unwrap(),
        ..Widget::default()
    };
    let request = FormatRequest::new("main", "w7").with_widget(&widget);
    assert_eq!(
        engine.format("{username}|{language}|{instance}|{wid}|{wname}|{view}|{login}", &request),
        "alice|de|7|w7|Heating|main|false"
    );
}

#[test]
fn test_values_override() {
    let engine = engine(json!({"a.val": 1}));
    let overrides = json!({"a.val": 2});
    let overrides = overrides.as_object().unwrap();
    let request = FormatRequest::new("main", "w1").with_values(overrides);
    assert_eq!(engine.format("{a}", &request), "2");
}

// ============================================================================
// Cache
// ============================================================================

#[test]
fn test_parser_runs_once_per_template_outside_edit_mode() {
    let calls = Arc::new(AtomicUsize::new(0));
    let engine = engine(json!({"a.val": 1})).with_parser(CountingParser {
        calls: calls.clone(),
    });

    assert_eq!(render(&engine, "{a}"), "1");
    assert_eq!(render(&engine, "{a}"), "1");
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    render(&engine, "no bindings");
    render(&engine, "no bindings");
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_edit_mode_parses_every_call() {
    let calls = Arc::new(AtomicUsize::new(0));
    let engine = engine(json!({"a.val": 1})).with_parser(CountingParser {
        calls: calls.clone(),
    });
    engine.set_edit_mode(true);

    render(&engine, "{a}");
    render(&engine, "{a}");
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert!(engine.cache().is_empty());
}

#[test]
fn test_engine_is_shareable_across_threads() {
    let engine = Arc::new(engine(json!({"a.val": 1})));
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let engine = Arc::clone(&engine);
            std::thread::spawn(move || {
                let template = format!("{{a;+({})}}", i);
                render(&engine, &template)
            })
        })
        .collect();

    let results: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(results, vec!["1", "2", "3", "4"]);
}
