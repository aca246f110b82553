//! Instruction Test Suite
//!
//! Validates the effect of every instruction on the operand stack.
//! Tests are organized by instruction category:
//! - Constant access (`getconstant`)
//! - Hash literals (`newhash`)
//! - Literal push (`putobject`, `putobject_INT2FIX_1_`)
//! - Stack slots (`nop`, `setn`)
//! - Sequences and limits
//!
//! # Running Tests
//! ```bash
//! cargo test --test instruction_tests
//! ```

use std::sync::{Arc, Mutex};
use yarv_engine::{
    ExecutionContext, HostObjectModel, Instruction, Interpreter, TraceEvent, Value, VmError,
    VmOptions,
};

/// Run `code` on a fresh context whose stack starts as `initial`
fn run_with_stack(
    model: &HostObjectModel,
    initial: Vec<Value>,
    code: &[Instruction],
) -> (ExecutionContext, Result<(), VmError>) {
    let mut ctx = ExecutionContext::new();
    for value in initial {
        ctx.stack_mut().push(value).unwrap();
    }
    let result = Interpreter::new(model).run(&mut ctx, code);
    (ctx, result)
}

fn stack_of(ctx: &ExecutionContext) -> Vec<Value> {
    ctx.stack().as_slice().to_vec()
}

// ===== Constant access =====

#[cfg(test)]
mod constants {
    use super::*;

    #[test]
    fn test_top_level_lookup_with_allow_nil() {
        let model = HostObjectModel::new();
        model.define_global_constant("Answer", Value::integer(42));

        let (ctx, result) = run_with_stack(
            &model,
            vec![Value::nil(), Value::bool(true)],
            &[Instruction::get_constant("Answer")],
        );

        result.unwrap();
        assert_eq!(stack_of(&ctx), vec![Value::integer(42)]);
    }

    #[test]
    fn test_nil_scope_without_allow_nil_raises() {
        let model = HostObjectModel::new();
        model.define_global_constant("Answer", Value::integer(42));

        for allow_nil in [Value::bool(false), Value::nil()] {
            let (ctx, result) = run_with_stack(
                &model,
                vec![Value::symbol("below"), Value::nil(), allow_nil],
                &[Instruction::get_constant("Answer")],
            );

            assert_eq!(
                result,
                Err(VmError::UninitializedConstant("Answer".to_string()))
            );
            // Operands consumed, nothing pushed
            assert_eq!(stack_of(&ctx), vec![Value::symbol("below")]);
        }
    }

    #[test]
    fn test_error_message() {
        let err = VmError::UninitializedConstant("Foo".to_string());
        assert_eq!(err.to_string(), "uninitialized constant Foo");
    }

    #[test]
    fn test_scoped_lookup_ignores_allow_nil() {
        let model = HostObjectModel::new();
        let outer = model.define_module("Outer", None);
        model.define_constant(&outer, "LIMIT", Value::integer(10));

        for allow_nil in [Value::bool(false), Value::bool(true)] {
            let (ctx, result) = run_with_stack(
                &model,
                vec![Value::class(outer.clone()), allow_nil],
                &[Instruction::get_constant("LIMIT")],
            );
            result.unwrap();
            assert_eq!(stack_of(&ctx), vec![Value::integer(10)]);
        }
    }

    #[test]
    fn test_scoped_lookup_walks_ancestors() {
        let model = HostObjectModel::new();
        let base = model.define_class("Base", None, None);
        let derived = model.define_class("Derived", Some(&base), None);
        model.define_constant(&base, "VERSION", Value::string("1.0"));

        let (ctx, result) = run_with_stack(
            &model,
            vec![Value::class(derived), Value::bool(false)],
            &[Instruction::get_constant("VERSION")],
        );
        result.unwrap();
        assert_eq!(stack_of(&ctx), vec![Value::string("1.0")]);
    }

    #[test]
    fn test_scoped_lookup_falls_back_to_top_level() {
        let model = HostObjectModel::new();
        let outer = model.define_module("Outer", None);

        let (ctx, result) = run_with_stack(
            &model,
            vec![Value::class(outer), Value::bool(false)],
            &[Instruction::get_constant("Integer")],
        );
        result.unwrap();
        assert_eq!(ctx.stack().peek().unwrap().inspect(), "Integer");
    }

    #[test]
    fn test_missing_scoped_constant_is_qualified() {
        let model = HostObjectModel::new();
        let outer = model.define_module("Outer", None);

        let (_, result) = run_with_stack(
            &model,
            vec![Value::class(outer), Value::bool(true)],
            &[Instruction::get_constant("Missing")],
        );
        assert_eq!(
            result,
            Err(VmError::UninitializedConstant("Outer::Missing".to_string()))
        );
    }

    #[test]
    fn test_missing_top_level_constant() {
        let model = HostObjectModel::new();

        let (_, result) = run_with_stack(
            &model,
            vec![Value::nil(), Value::bool(true)],
            &[Instruction::get_constant("Missing")],
        );
        assert_eq!(
            result,
            Err(VmError::UninitializedConstant("Missing".to_string()))
        );
    }

    #[test]
    fn test_non_class_scope_is_type_error() {
        let model = HostObjectModel::new();

        let (_, result) = run_with_stack(
            &model,
            vec![Value::integer(3), Value::bool(true)],
            &[Instruction::get_constant("Foo")],
        );
        assert_eq!(
            result,
            Err(VmError::TypeError("3 is not a class/module".to_string()))
        );
    }

    #[test]
    fn test_nested_lookup_chain() {
        // Outer::Inner::VALUE
        let model = HostObjectModel::new();
        let outer = model.define_module("Outer", None);
        let inner = model.define_class("Inner", None, Some(&outer));
        model.define_constant(&inner, "VALUE", Value::symbol("found"));

        let code = vec![
            Instruction::put_object(Value::nil()),
            Instruction::put_object(Value::bool(true)),
            Instruction::get_constant("Outer"),
            Instruction::put_object(Value::bool(false)),
            Instruction::get_constant("Inner"),
            Instruction::put_object(Value::bool(false)),
            Instruction::get_constant("VALUE"),
        ];
        let (ctx, result) = run_with_stack(&model, vec![], &code);
        result.unwrap();
        assert_eq!(stack_of(&ctx), vec![Value::symbol("found")]);
    }

    #[test]
    fn test_lookup_records_last_constant() {
        let model = HostObjectModel::new();
        let (ctx, result) = run_with_stack(
            &model,
            vec![Value::nil(), Value::bool(true)],
            &[Instruction::get_constant("Hash")],
        );
        result.unwrap();

        let resolved = ctx.last_constant().unwrap();
        assert_eq!(&*resolved.name, "Hash");
        assert_eq!(resolved.value.inspect(), "Hash");
    }

    #[test]
    fn test_underflow() {
        let model = HostObjectModel::new();
        let (_, result) = run_with_stack(
            &model,
            vec![Value::nil()],
            &[Instruction::get_constant("Object")],
        );
        assert_eq!(
            result,
            Err(VmError::StackUnderflow {
                needed: 2,
                depth: 1
            })
        );
    }
}

// ===== Hash literals =====

#[cfg(test)]
mod hashes {
    use super::*;

    #[test]
    fn test_empty_hash() {
        let model = HostObjectModel::new();
        let (ctx, result) = run_with_stack(&model, vec![], &[Instruction::new_hash(0)]);
        result.unwrap();

        let top = ctx.stack().peek().unwrap();
        assert!(top.as_hash().unwrap().is_empty());
        assert_eq!(top.inspect(), "{}");
    }

    #[test]
    fn test_pairs_in_push_order() {
        let model = HostObjectModel::new();
        let (ctx, result) = run_with_stack(
            &model,
            vec![
                Value::string("keep"),
                Value::symbol("a"),
                Value::integer(1),
                Value::symbol("b"),
                Value::integer(2),
            ],
            &[Instruction::new_hash(4)],
        );
        result.unwrap();

        assert_eq!(ctx.stack().depth(), 2);
        assert_eq!(ctx.stack().peek_n(1).unwrap(), &Value::string("keep"));

        let hash = ctx.stack().peek().unwrap();
        assert_eq!(hash.inspect(), "{:a=>1, :b=>2}");
        let entries = hash.as_hash().unwrap();
        assert_eq!(entries.get(&Value::symbol("a")), Some(&Value::integer(1)));
        assert_eq!(entries.get(&Value::symbol("b")), Some(&Value::integer(2)));
    }

    #[test]
    fn test_duplicate_key_last_wins() {
        let model = HostObjectModel::new();
        let (ctx, result) = run_with_stack(
            &model,
            vec![
                Value::symbol("k"),
                Value::integer(1),
                Value::symbol("other"),
                Value::nil(),
                Value::symbol("k"),
                Value::integer(2),
            ],
            &[Instruction::new_hash(6)],
        );
        result.unwrap();

        let hash = ctx.stack().peek().unwrap();
        let entries = hash.as_hash().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries.get(&Value::symbol("k")), Some(&Value::integer(2)));
        assert_eq!(hash.inspect(), "{:k=>2, :other=>nil}");
    }

    #[test]
    fn test_integer_and_float_keys_are_distinct() {
        let model = HostObjectModel::new();
        let (ctx, result) = run_with_stack(
            &model,
            vec![
                Value::integer(1),
                Value::symbol("int"),
                Value::float(1.0),
                Value::symbol("float"),
            ],
            &[Instruction::new_hash(4)],
        );
        result.unwrap();
        assert_eq!(ctx.stack().peek().unwrap().as_hash().unwrap().len(), 2);
    }

    #[test]
    fn test_odd_size_is_rejected() {
        let model = HostObjectModel::new();
        let (ctx, result) = run_with_stack(
            &model,
            vec![Value::integer(1), Value::integer(2), Value::integer(3)],
            &[Instruction::new_hash(3)],
        );
        assert!(matches!(result, Err(VmError::InvalidOperand(_))));
        assert_eq!(ctx.stack().depth(), 3);
    }

    #[test]
    fn test_underflow() {
        let model = HostObjectModel::new();
        let (_, result) = run_with_stack(
            &model,
            vec![Value::integer(1), Value::integer(2)],
            &[Instruction::new_hash(4)],
        );
        assert_eq!(
            result,
            Err(VmError::StackUnderflow {
                needed: 4,
                depth: 2
            })
        );
    }
}

// ===== Literal push =====

#[cfg(test)]
mod objects {
    use super::*;

    #[test]
    fn test_putobject_pushes_literal() {
        let model = HostObjectModel::new();
        let literal = Value::string("frozen");
        let (ctx, result) = run_with_stack(
            &model,
            vec![],
            &[Instruction::put_object(literal.clone())],
        );
        result.unwrap();
        assert_eq!(stack_of(&ctx), vec![literal]);
    }

    #[test]
    fn test_putobject_operand_is_reused() {
        let model = HostObjectModel::new();
        let insn = Instruction::put_object(Value::symbol("sym"));
        let (ctx, result) = run_with_stack(&model, vec![], &[insn.clone(), insn.clone()]);
        result.unwrap();
        assert_eq!(
            stack_of(&ctx),
            vec![Value::symbol("sym"), Value::symbol("sym")]
        );
        assert_eq!(insn, Instruction::put_object(Value::symbol("sym")));
    }

    #[test]
    fn test_int2fix_1_matches_putobject_1() {
        let model = HostObjectModel::new();
        let initial = vec![Value::nil(), Value::string("x")];

        let (specialized, r1) =
            run_with_stack(&model, initial.clone(), &[Instruction::PutObjectInt2Fix1]);
        let (generic, r2) = run_with_stack(
            &model,
            initial,
            &[Instruction::put_object(Value::integer(1))],
        );
        r1.unwrap();
        r2.unwrap();
        assert_eq!(stack_of(&specialized), stack_of(&generic));
    }

    #[test]
    fn test_line_event_before_push() {
        let model = HostObjectModel::new();
        let mut ctx = ExecutionContext::new();

        let seen: Arc<Mutex<Vec<TraceEvent>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        ctx.set_trace_hook(Arc::new(move |event: &TraceEvent| {
            sink.lock().unwrap().push(*event);
        }));

        let code = vec![
            Instruction::put_object(Value::integer(5)),
            Instruction::Nop,
            Instruction::PutObjectInt2Fix1,
            Instruction::set_n(1),
        ];
        Interpreter::new(&model).run(&mut ctx, &code).unwrap();

        let events = seen.lock().unwrap().clone();
        assert_eq!(
            events,
            vec![
                TraceEvent::Line {
                    instruction: "putobject"
                },
                TraceEvent::Line {
                    instruction: "putobject_INT2FIX_1_"
                },
            ]
        );
        // Hooks never touch the stack
        assert_eq!(stack_of(&ctx), vec![Value::integer(1), Value::integer(1)]);
    }

    #[test]
    fn test_line_events_can_be_disabled() {
        let model = HostObjectModel::new();
        let options = VmOptions {
            trace_lines: false,
            ..Default::default()
        };
        let mut ctx = ExecutionContext::with_options(options);

        let count = Arc::new(Mutex::new(0usize));
        let sink = Arc::clone(&count);
        ctx.set_trace_hook(Arc::new(move |_: &TraceEvent| {
            *sink.lock().unwrap() += 1;
        }));

        Interpreter::new(&model)
            .run(&mut ctx, &[Instruction::PutObjectInt2Fix1])
            .unwrap();
        assert_eq!(*count.lock().unwrap(), 0);
        assert_eq!(ctx.stack().depth(), 1);
    }

    #[test]
    fn test_overflowing_push_dispatches_no_event() {
        let model = HostObjectModel::new();
        let mut ctx = ExecutionContext::with_options(VmOptions {
            max_stack_size: 1,
            ..Default::default()
        });

        let count = Arc::new(Mutex::new(0usize));
        let sink = Arc::clone(&count);
        ctx.set_trace_hook(Arc::new(move |_: &TraceEvent| {
            *sink.lock().unwrap() += 1;
        }));

        let mut interpreter = Interpreter::new(&model);
        interpreter
            .execute(&mut ctx, &Instruction::PutObjectInt2Fix1)
            .unwrap();
        let result = interpreter.execute(&mut ctx, &Instruction::put_object(Value::nil()));

        assert_eq!(result, Err(VmError::StackOverflow { max: 1 }));
        assert_eq!(*count.lock().unwrap(), 1);
        assert_eq!(stack_of(&ctx), vec![Value::integer(1)]);
    }

    #[test]
    fn test_overflow_at_configured_limit() {
        let model = HostObjectModel::new();
        let options = VmOptions {
            max_stack_size: 2,
            ..Default::default()
        };
        let mut ctx = ExecutionContext::with_options(options);

        let code = vec![Instruction::PutObjectInt2Fix1; 3];
        let result = Interpreter::new(&model).run(&mut ctx, &code);
        assert_eq!(result, Err(VmError::StackOverflow { max: 2 }));
        assert_eq!(ctx.stack().depth(), 2);
    }
}

// ===== Stack slots =====

#[cfg(test)]
mod stack_slots {
    use super::*;

    #[test]
    fn test_nop_leaves_stack_alone() {
        let model = HostObjectModel::new();
        let initial = vec![Value::integer(1), Value::symbol("a")];
        let (ctx, result) = run_with_stack(&model, initial.clone(), &[Instruction::Nop]);
        result.unwrap();
        assert_eq!(stack_of(&ctx), initial);

        let (ctx, result) = run_with_stack(&model, vec![], &[Instruction::Nop]);
        result.unwrap();
        assert!(ctx.stack().is_empty());
    }

    #[test]
    fn test_setn_overwrites_slot_below_top() {
        // `{}[:key] = 'val'` leaves the assigned value below the receiver
        let model = HostObjectModel::new();
        let (ctx, result) = run_with_stack(
            &model,
            vec![
                Value::nil(),
                Value::symbol("recv"),
                Value::symbol("key"),
                Value::string("val"),
            ],
            &[Instruction::set_n(3)],
        );
        result.unwrap();
        assert_eq!(
            stack_of(&ctx),
            vec![
                Value::string("val"),
                Value::symbol("recv"),
                Value::symbol("key"),
                Value::string("val"),
            ]
        );
    }

    #[test]
    fn test_setn_one_targets_next_slot() {
        let model = HostObjectModel::new();
        let (ctx, result) = run_with_stack(
            &model,
            vec![Value::integer(1), Value::integer(2), Value::integer(3)],
            &[Instruction::set_n(1)],
        );
        result.unwrap();
        assert_eq!(
            stack_of(&ctx),
            vec![Value::integer(1), Value::integer(3), Value::integer(3)]
        );
    }

    #[test]
    fn test_setn_zero_is_identity() {
        let model = HostObjectModel::new();
        let initial = vec![Value::integer(1), Value::integer(2)];
        let (ctx, result) = run_with_stack(&model, initial.clone(), &[Instruction::set_n(0)]);
        result.unwrap();
        assert_eq!(stack_of(&ctx), initial);
    }

    #[test]
    fn test_setn_underflow() {
        let model = HostObjectModel::new();
        let (ctx, result) = run_with_stack(
            &model,
            vec![Value::integer(1), Value::integer(2)],
            &[Instruction::set_n(2)],
        );
        assert!(matches!(result, Err(VmError::StackUnderflow { .. })));
        assert_eq!(stack_of(&ctx), vec![Value::integer(1), Value::integer(2)]);
    }

    #[test]
    fn test_setn_huge_index_is_underflow() {
        let model = HostObjectModel::new();
        let (ctx, result) = run_with_stack(
            &model,
            vec![Value::integer(1)],
            &[Instruction::set_n(usize::MAX)],
        );
        assert_eq!(
            result,
            Err(VmError::StackUnderflow {
                needed: usize::MAX,
                depth: 1
            })
        );
        assert_eq!(stack_of(&ctx), vec![Value::integer(1)]);
    }

    #[test]
    fn test_setn_on_empty_stack() {
        let model = HostObjectModel::new();
        let (_, result) = run_with_stack(&model, vec![], &[Instruction::set_n(0)]);
        assert!(matches!(result, Err(VmError::StackUnderflow { .. })));
    }
}

// ===== Sequences and limits =====

#[cfg(test)]
mod sequences {
    use super::*;
    use yarv_engine::verify_sequence;

    #[test]
    fn test_hash_literal_sequence() {
        // { a: 1, b: Integer }
        let model = HostObjectModel::new();
        let code = vec![
            Instruction::put_object(Value::symbol("a")),
            Instruction::PutObjectInt2Fix1,
            Instruction::put_object(Value::symbol("b")),
            Instruction::put_object(Value::nil()),
            Instruction::put_object(Value::bool(true)),
            Instruction::get_constant("Integer"),
            Instruction::opt_set_inline_cache(0),
            Instruction::new_hash(4),
            Instruction::Nop,
        ];
        assert_eq!(verify_sequence(&code), Ok(5));

        let mut ctx = ExecutionContext::new();
        Interpreter::new(&model).run(&mut ctx, &code).unwrap();
        assert_eq!(ctx.stack().depth(), 1);
        assert_eq!(ctx.stack().peek().unwrap().inspect(), "{:a=>1, :b=>Integer}");
        assert_eq!(ctx.steps(), code.len() as u64);
    }

    #[test]
    fn test_run_stops_at_first_error() {
        let model = HostObjectModel::new();
        let code = vec![
            Instruction::put_object(Value::nil()),
            Instruction::put_object(Value::bool(false)),
            Instruction::get_constant("Anything"),
            Instruction::PutObjectInt2Fix1,
        ];
        let mut ctx = ExecutionContext::new();
        let result = Interpreter::new(&model).run(&mut ctx, &code);
        assert_eq!(
            result,
            Err(VmError::UninitializedConstant("Anything".to_string()))
        );
        assert!(ctx.stack().is_empty());
        assert_eq!(ctx.steps(), 3);
    }

    #[test]
    fn test_step_budget() {
        let model = HostObjectModel::new();
        let mut ctx = ExecutionContext::with_options(VmOptions::with_step_budget(2));
        let code = vec![Instruction::Nop; 3];

        let result = Interpreter::new(&model).run(&mut ctx, &code);
        assert_eq!(result, Err(VmError::StepLimitExceeded(2)));
        assert_eq!(ctx.steps(), 2);
    }

    #[test]
    fn test_execute_single_instruction() {
        let model = HostObjectModel::new();
        let mut ctx = ExecutionContext::new();
        Instruction::PutObjectInt2Fix1
            .execute(&mut ctx, &model)
            .unwrap();
        Instruction::put_object(Value::integer(9))
            .execute(&mut ctx, &model)
            .unwrap();
        Instruction::set_n(1).execute(&mut ctx, &model).unwrap();
        assert_eq!(stack_of(&ctx), vec![Value::integer(9), Value::integer(9)]);
    }
}
