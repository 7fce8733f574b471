//! canonical and legacy genome JSON.
//!
//! one shape is written: lowercase field names, snake_case enum strings,
//! phases as `{ "type": "...", "data": { ... } }`. two shapes are read:
//! the canonical one, and an older flat encoding that put phase fields at
//! the top of the phase object, suffixed phase tags with `Phase`, upper-
//! or camel-cased enum strings, and used a handful of different field
//! names. the reader normalizes either shape into canonical form before
//! typed deserialization, so unknown enum strings are a hard parse error
//! rather than a silently dropped field.

use super::rules::Genome;
use anyhow::Context;
use anyhow::Result;
use anyhow::bail;
use serde_json::Map;
use serde_json::Value;

impl Genome {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("genome serialization is infallible")
    }
    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).expect("genome serialization is infallible")
    }
    pub fn from_json(text: &str) -> Result<Genome> {
        let raw: Value = serde_json::from_str(text).context("malformed genome JSON")?;
        let canonical = normalize(raw)?;
        serde_json::from_value(canonical).context("genome JSON did not match the schema")
    }
}

const PHASE_KINDS: [&str; 7] = [
    "draw", "play", "discard", "trick", "betting", "claim", "bidding",
];

/// lowercase, with an underscore wherever an uppercase follows a
/// lowercase or digit. "MatchRank" -> "match_rank", "EQ" -> "eq".
fn snakeify(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    let mut prev_lower = false;
    for c in s.chars() {
        if c.is_ascii_uppercase() {
            if prev_lower {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
            prev_lower = false;
        } else {
            prev_lower = c.is_ascii_lowercase() || c.is_ascii_digit();
            out.push(c);
        }
    }
    out
}

fn lower_keys(obj: Map<String, Value>) -> Map<String, Value> {
    obj.into_iter()
        .map(|(k, v)| (k.to_ascii_lowercase(), v))
        .collect()
}

fn rename(obj: &mut Map<String, Value>, from: &str, to: &str) {
    if let Some(v) = obj.remove(from) {
        obj.entry(to.to_string()).or_insert(v);
    }
}

/// snakeify the string value at `key`, if present
fn norm_enum(obj: &mut Map<String, Value>, key: &str) {
    if let Some(Value::String(s)) = obj.get(key) {
        let canonical = snakeify(s);
        obj.insert(key.to_string(), Value::String(canonical));
    }
}

fn as_object(v: Value, what: &str) -> Result<Map<String, Value>> {
    match v {
        Value::Object(m) => Ok(m),
        other => bail!("{} must be an object, found {}", what, other),
    }
}

fn normalize(root: Value) -> Result<Value> {
    let mut root = lower_keys(as_object(root, "genome")?);
    root.remove("schema_version");
    root.remove("min_turns");
    rename(&mut root, "genome_id", "name");
    rename(&mut root, "special_effects", "effects");
    rename(&mut root, "scoring_rules", "card_scoring");
    if let Some(setup) = root.remove("setup") {
        root.insert("setup".into(), normalize_setup(setup)?);
    }
    if let Some(turns) = root.remove("turn_structure") {
        root.insert("turn_structure".into(), normalize_turns(turns)?);
    }
    if let Some(Value::Array(wins)) = root.remove("win_conditions") {
        let wins = wins
            .into_iter()
            .map(normalize_wincon)
            .collect::<Result<Vec<_>>>()?;
        root.insert("win_conditions".into(), Value::Array(wins));
    }
    if let Some(Value::Array(effects)) = root.remove("effects") {
        let effects = effects
            .into_iter()
            .map(normalize_effect)
            .collect::<Result<Vec<_>>>()?;
        root.insert("effects".into(), Value::Array(effects));
    }
    if let Some(Value::Array(rules)) = root.remove("card_scoring") {
        let rules = rules
            .into_iter()
            .map(normalize_scoring)
            .collect::<Result<Vec<_>>>()?;
        root.insert("card_scoring".into(), Value::Array(rules));
    }
    match root.remove("hand_eval") {
        None | Some(Value::Null) => (),
        Some(eval) => {
            root.insert("hand_eval".into(), normalize_handeval(eval)?);
        }
    }
    if let Some(Value::Object(teams)) = root.remove("teams") {
        root.insert("teams".into(), Value::Object(lower_keys(teams)));
    }
    Ok(Value::Object(root))
}

fn normalize_setup(setup: Value) -> Result<Value> {
    let mut setup = lower_keys(as_object(setup, "setup")?);
    rename(&mut setup, "player_count", "num_players");
    Ok(Value::Object(setup))
}

fn normalize_turns(turns: Value) -> Result<Value> {
    let mut turns = lower_keys(as_object(turns, "turn_structure")?);
    norm_enum(&mut turns, "tableau_mode");
    norm_enum(&mut turns, "sequence_direction");
    if let Some(Value::String(dir)) = turns.get("sequence_direction") {
        // the legacy writer abbreviated directions
        let full = match dir.as_str() {
            "asc" => Some("ascending"),
            "desc" => Some("descending"),
            _ => None,
        };
        if let Some(full) = full {
            turns.insert("sequence_direction".into(), Value::String(full.into()));
        }
    }
    if let Some(Value::Array(phases)) = turns.remove("phases") {
        let phases = phases
            .into_iter()
            .enumerate()
            .map(|(i, p)| normalize_phase(p, i))
            .collect::<Result<Vec<_>>>()?;
        turns.insert("phases".into(), Value::Array(phases));
    }
    Ok(Value::Object(turns))
}

fn normalize_phase(phase: Value, index: usize) -> Result<Value> {
    let mut phase = lower_keys(as_object(phase, "phase")?);
    let tag = match phase.remove("type") {
        Some(Value::String(s)) => s,
        _ => bail!("phase {} is missing its type tag", index),
    };
    let tag = snakeify(&tag);
    let tag = tag.strip_suffix("_phase").unwrap_or(&tag).to_string();
    if !PHASE_KINDS.contains(&tag.as_str()) {
        bail!("phase {}: unknown phase type {:?}", index, tag);
    }
    // nested shape carries a data object; the flat legacy shape keeps
    // phase fields beside the tag and we fold them under data here
    let mut data = match phase.remove("data") {
        Some(data) => lower_keys(as_object(data, "phase data")?),
        None => phase,
    };
    for key in ["source", "target"] {
        norm_enum(&mut data, key);
    }
    for key in ["condition", "valid_play_condition"] {
        match data.remove(key) {
            None | Some(Value::Null) => (),
            Some(cond) => {
                data.insert(key.to_string(), normalize_condition(cond)?);
            }
        }
    }
    let mut out = Map::new();
    out.insert("type".into(), Value::String(tag));
    out.insert("data".into(), Value::Object(data));
    Ok(Value::Object(out))
}

fn normalize_condition(cond: Value) -> Result<Value> {
    let mut cond = lower_keys(as_object(cond, "condition")?);
    rename(&mut cond, "opcode", "op");
    rename(&mut cond, "operator", "cmp");
    rename(&mut cond, "location", "reference");
    norm_enum(&mut cond, "op");
    norm_enum(&mut cond, "cmp");
    norm_enum(&mut cond, "reference");
    Ok(Value::Object(cond))
}

fn normalize_wincon(win: Value) -> Result<Value> {
    let mut win = lower_keys(as_object(win, "win condition")?);
    norm_enum(&mut win, "type");
    Ok(Value::Object(win))
}

fn normalize_effect(effect: Value) -> Result<Value> {
    let mut effect = lower_keys(as_object(effect, "effect")?);
    rename(&mut effect, "rank", "trigger_rank");
    norm_enum(&mut effect, "effect");
    norm_enum(&mut effect, "target");
    Ok(Value::Object(effect))
}

fn normalize_scoring(rule: Value) -> Result<Value> {
    let mut rule = lower_keys(as_object(rule, "scoring rule")?);
    norm_enum(&mut rule, "trigger");
    Ok(Value::Object(rule))
}

fn normalize_handeval(eval: Value) -> Result<Value> {
    let mut eval = lower_keys(as_object(eval, "hand_eval")?);
    norm_enum(&mut eval, "type");
    if let Some(Value::Array(patterns)) = eval.remove("patterns") {
        let patterns = patterns
            .into_iter()
            .map(|p| Ok(Value::Object(lower_keys(as_object(p, "pattern")?))))
            .collect::<Result<Vec<_>>>()?;
        eval.insert("patterns".into(), Value::Array(patterns));
    }
    Ok(Value::Object(eval))
}
