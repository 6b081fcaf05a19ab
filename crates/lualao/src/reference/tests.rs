use super::*;
use crate::ffi;
use crate::NativeFunction;
use pretty_assertions::assert_eq;
use std::ffi::c_int;

fn state_with(source: &str) -> State {
    let state = State::new().unwrap();
    state.load_string(source).unwrap();
    state
}

// === Validity ===

#[test]
fn test_valid_after_matching_push() {
    let state = State::new().unwrap();
    state.push(1.5);
    let number = state.number_at(1);
    assert!(number.is_valid());
    assert_eq!(number.value(), 1.5);
}

#[test]
fn test_invalid_after_slot_retyped() {
    let state = State::new().unwrap();
    state.push(1.5);
    let number = state.number_at(1);
    state.pop(1);
    state.push("not a number");
    assert!(!number.is_valid());
    assert_eq!(number.value(), 0.0);
}

#[test]
fn test_revalidates_when_matching_type_returns() {
    let state = State::new().unwrap();
    let flag = state.boolean_at(1);
    assert!(!flag.is_valid());
    state.push(true);
    assert!(flag.is_valid());
    assert!(flag.value());
}

#[test]
fn test_invalid_when_stack_shrinks_below_index() {
    let state = State::new().unwrap();
    state.push(1);
    state.push(2);
    let second = state.number_at(2);
    assert!(second.is_valid());
    state.pop(1);
    assert!(!second.is_valid());
    assert_eq!(second.get(), None);
}

#[test]
fn test_index_zero_is_never_valid() {
    let state = State::new().unwrap();
    state.push(1);
    let zero = StackReference::new(&state, 0, TypeTag::Number);
    assert!(!zero.is_valid());
    assert_eq!(state.number_at(0).value(), 0.0);
}

#[test]
fn test_empty_stack_is_never_valid() {
    let state = State::new().unwrap();
    assert!(!state.number_at(StackIndex::TOP).is_valid());
    assert!(!state.string_at(1).is_valid());
}

#[test]
fn test_top_relative_reference_follows_top() {
    let state = State::new().unwrap();
    state.push(10);
    let top = state.number_at(StackIndex::TOP);
    assert_eq!(top.value(), 10.0);
    state.push(20);
    assert_eq!(top.value(), 20.0);
    state.push("x");
    assert!(!top.is_valid());
}

#[test]
fn test_validity_check_has_no_side_effects() {
    let state = State::new().unwrap();
    state.push("text");
    let text = state.string_at(-1);
    let before = state.dump();
    for _ in 0..3 {
        assert!(text.is_valid());
    }
    assert_eq!(state.dump(), before);
}

#[test]
fn test_number_slot_is_not_a_string_reference() {
    let state = State::new().unwrap();
    state.push(5);
    let text = state.string_at(1);
    assert!(!text.is_valid());
    assert_eq!(text.value(), "");
    // Reading must not convert the number in place
    assert_eq!(state.type_at(1), TypeTag::Number);
}

#[test]
fn test_identity_values_of_invalid_references() {
    let state = State::new().unwrap();
    assert_eq!(state.number_at(3).value(), 0.0);
    assert_eq!(state.string_at(3).value(), "");
    assert!(!state.boolean_at(3).value());
}

#[test]
fn test_reference_reports_tag_and_index() {
    let state = State::new().unwrap();
    let table = state.table_at(-2);
    assert_eq!(table.tag(), TypeTag::Table);
    assert_eq!(table.index(), StackIndex::new(-2));
}

// === Ownership ===

#[test]
fn test_reference_outliving_state_is_detached() {
    let state = State::new().unwrap();
    state.push("kept");
    let text = state.string_at(1);
    assert!(!text.is_detached());
    drop(state);
    assert!(text.is_detached());
    assert!(!text.is_valid());
    assert_eq!(text.value(), "");
}

#[test]
fn test_reference_survives_while_any_clone_lives() {
    let state = State::new().unwrap();
    let other = state.clone();
    state.push(3);
    let number = state.number_at(1);
    drop(state);
    assert!(number.is_valid());
    assert_eq!(number.value(), 3.0);
    drop(other);
    assert!(number.is_detached());
}

// === Function calls ===

#[test]
fn test_call_leaves_results() {
    let state = state_with("function add(a, b) return a + b end");
    let add = state.get_function("add", 2, 1);
    assert!(add.is_valid());
    state.push(3);
    state.push(4);
    add.call().unwrap();
    assert_eq!(state.size(), 1);
    assert_eq!(state.number_at(StackIndex::TOP).value(), 7.0);
}

#[test]
fn test_call_with_many_results_grows_stack() {
    let state = state_with("function one() return 1 end");
    let one = state.get_function("one", 0, 200_000);
    one.call().unwrap();
    assert_eq!(state.size(), 200_000);
    assert_eq!(state.number_at(1).value(), 1.0);
    assert_eq!(state.type_at(StackIndex::TOP), TypeTag::Nil);
}

#[test]
fn test_call_with_results_beyond_stack_limit() {
    let state = state_with("function one() return 1 end");
    let one = state.get_function("one", 0, 2_000_000);
    let before = state.dump();
    let err = one.call().unwrap_err();
    assert_eq!(err, LuaError::StackExhausted { needed: 2_000_000 });
    assert_eq!(state.dump(), before);
}

#[test]
fn test_call_with_too_few_arguments() {
    let state = state_with("function add(a, b) return a + b end");
    let add = state.get_function("add", 2, 1);
    state.push(3);
    let before = state.dump();
    let err = add.call().unwrap_err();
    assert_eq!(
        err,
        LuaError::InsufficientArguments {
            expected: 2,
            found: 1
        }
    );
    assert_eq!(state.dump(), before);
}

#[test]
fn test_call_on_invalid_reference_is_noop() {
    let state = State::new().unwrap();
    let missing = state.get_function("does_not_exist", 0, 1);
    assert!(!missing.is_valid());
    let before = state.size();
    missing.call().unwrap();
    assert_eq!(state.size(), before);
}

#[test]
fn test_call_after_state_dropped() {
    let state = state_with("function noop() end");
    let noop = state.get_function("noop", 0, 0);
    drop(state);
    assert_eq!(noop.call(), Err(LuaError::StateExpired));
}

#[test]
fn test_call_runtime_error_carries_engine_message() {
    let state = state_with("function boom() error('kaboom', 0) end");
    let boom = state.get_function("boom", 0, 0);
    let err = boom.call().unwrap_err();
    assert_eq!(
        err,
        LuaError::Runtime {
            message: "kaboom".to_owned()
        }
    );
    assert!(err.is_engine_error());
    assert_eq!(state.size(), 0);
}

#[test]
fn test_call_with_message_handler() {
    let state = state_with(
        "function handler(m) return 'handled: ' .. m end
         function boom() error('kaboom', 0) end",
    );
    let handler = state.get_function("handler", 1, 1);
    let boom = state.get_function("boom", 0, 0);
    let err = boom.call_with_handler(handler.index()).unwrap_err();
    assert_eq!(err.to_string(), "handled: kaboom");
    assert_eq!(state.size(), 1);
    assert!(handler.is_valid());
}

#[test]
fn test_call_with_out_of_range_handler() {
    let state = state_with("function boom() error('kaboom', 0) end");
    let boom = state.get_function("boom", 0, 0);
    let err = boom.call_with_handler(StackIndex::new(5)).unwrap_err();
    assert_eq!(
        err,
        LuaError::InvalidHandler {
            index: StackIndex::new(5)
        }
    );
    assert_eq!(state.size(), 1);
}

#[test]
fn test_call_with_handler_above_function() {
    let state = state_with(
        "function handler(m) return m end
         function boom() error('kaboom', 0) end",
    );
    let boom = state.get_function("boom", 0, 0);
    state.get_function("handler", 1, 1);
    let err = boom.call_with_handler(StackIndex::TOP).unwrap_err();
    assert!(matches!(err, LuaError::InvalidHandler { .. }));
    assert_eq!(state.size(), 2);
}

#[test]
fn test_function_reference_records_arity() {
    let state = State::new().unwrap();
    let f = state.function_at(1, 3, 2);
    assert_eq!((f.input(), f.output()), (3, 2));
}

// === Tables ===

const PLAYER: &str = r#"
    Player = {
        Name = "Rin",
        Level = 7,
        IsHero = true,
        Double = function(x) return x * 2 end,
        Stats = { Speed = 12 },
    }
"#;

#[test]
fn test_table_field_lookups() {
    let state = state_with(PLAYER);
    let player = state.get_table("Player");
    assert!(player.is_valid());

    assert_eq!(player.get_string("Name").value(), "Rin");
    assert_eq!(player.get_number("Level").value(), 7.0);
    assert!(player.get_boolean("IsHero").value());
    assert_eq!(state.size(), 4);
}

const GUARDED: &str = r#"
    Guarded = setmetatable({ Known = 1 }, {
        __index = function(_, key) error("no field " .. key, 0) end,
        __newindex = function(_, key) error("cannot add " .. key, 0) end,
    })
"#;

#[test]
fn test_lookup_through_raising_index_is_invalid() {
    let state = state_with(GUARDED);
    let guarded = state.get_table("Guarded");
    assert_eq!(guarded.get_number("Known").value(), 1.0);

    let before = state.size();
    let missing = guarded.get_string("x");
    assert!(!missing.is_valid());
    assert_eq!(state.size(), before + 1);
    assert_eq!(state.type_at(StackIndex::TOP), TypeTag::Nil);
    assert!(guarded.get_table("y").get_number("z").get().is_none());
}

#[test]
fn test_set_through_raising_newindex() {
    let state = state_with(GUARDED);
    let guarded = state.get_table("Guarded");
    let before = state.dump();
    let err = guarded.set("Fresh", 1).unwrap_err();
    assert_eq!(
        err,
        LuaError::Runtime {
            message: "cannot add Fresh".to_owned()
        }
    );
    assert_eq!(state.dump(), before);

    // Existing keys bypass `__newindex`
    guarded.set("Known", 2).unwrap();
    assert_eq!(guarded.get_number("Known").value(), 2.0);
}

#[test]
fn test_missing_field_is_invalid_and_grows_stack() {
    let state = state_with(PLAYER);
    let player = state.get_table("Player");
    let before = state.size();
    let missing = player.get_string("Missing");
    assert!(!missing.is_valid());
    assert_eq!(missing.value(), "");
    assert_eq!(state.size(), before + 1);
}

#[test]
fn test_wrong_field_type_is_invalid() {
    let state = state_with(PLAYER);
    let player = state.get_table("Player");
    let name = player.get_number("Name");
    assert!(!name.is_valid());
    assert_eq!(name.value(), 0.0);
}

#[test]
fn test_table_function_field() {
    let state = state_with(PLAYER);
    let player = state.get_table("Player");
    let double = player.get_function("Double", 1, 1);
    state.push(12);
    double.call().unwrap();
    assert_eq!(state.number_at(-1).value(), 24.0);
}

#[test]
fn test_nested_table() {
    let state = state_with(PLAYER);
    let stats = state.get_table("Player").get_table("Stats");
    assert!(stats.is_valid());
    assert_eq!(stats.get_number("Speed").value(), 12.0);
    assert_eq!(state.size(), 3);
}

#[test]
fn test_top_relative_table_reference() {
    let state = state_with(PLAYER);
    state.get_table("Player");
    let player = state.table_at(StackIndex::TOP);
    let name = player.get_string("Name");
    assert_eq!(name.value(), "Rin");
    // The table is no longer on top, so the top-relative reference moved on
    assert!(!player.is_valid());
}

#[test]
fn test_lookup_through_invalid_table_pushes_nil() {
    let state = State::new().unwrap();
    state.push(1);
    let not_a_table = state.table_at(1);
    let field = not_a_table.get_number("x");
    assert!(!field.is_valid());
    assert_eq!(state.size(), 2);
    assert_eq!(state.type_at(-1), TypeTag::Nil);
}

#[test]
fn test_lookup_after_state_dropped() {
    let state = state_with(PLAYER);
    let player = state.get_table("Player");
    drop(state);
    let name = player.get_string("Name");
    assert!(name.is_detached());
    assert_eq!(name.value(), "");
}

#[test]
fn test_set_fields_without_net_growth() {
    let state = state_with(PLAYER);
    let player = state.get_table("Player");
    let before = state.size();
    player.set("Name", "Kai").unwrap();
    player.set("Level", 8).unwrap();
    player.set("Ratio", 0.25).unwrap();
    player.set("IsHero", false).unwrap();
    player.set("Title", ()).unwrap();
    assert_eq!(state.size(), before);

    assert_eq!(player.get_string("Name").value(), "Kai");
    assert_eq!(player.get_number("Level").value(), 8.0);
    assert_eq!(player.get_number("Ratio").value(), 0.25);
    assert_eq!(player.get_boolean("IsHero").get(), Some(false));
}

#[test]
fn test_set_on_invalid_table_is_skipped() {
    let state = State::new().unwrap();
    state.push("string");
    let not_a_table = state.table_at(1);
    let before = state.dump();
    not_a_table.set("x", 1).unwrap();
    assert_eq!(state.dump(), before);
}

#[test]
fn test_set_after_state_dropped() {
    let state = state_with(PLAYER);
    let player = state.get_table("Player");
    drop(state);
    assert_eq!(player.set("Name", "Kai"), Err(LuaError::StateExpired));
}

#[allow(
    unsafe_code,
    reason = "native callbacks are written against the C API"
)]
unsafe extern "C-unwind" fn answer(state: *mut ffi::lua_State) -> c_int {
    ffi::lua_pushinteger(state, 42);
    1
}

#[test]
fn test_set_native_callback() {
    let state = state_with("Config = {}");
    let config = state.get_table("Config");
    config.set("answer", answer as NativeFunction).unwrap();
    state.pop(1);

    state.load_string("result = Config.answer()").unwrap();
    assert_eq!(state.get_number("result").value(), 42.0);
}
