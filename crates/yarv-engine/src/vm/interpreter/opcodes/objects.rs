use crate::compiler::Instruction;
use crate::vm::context::ExecutionContext;
use crate::vm::interpreter::Interpreter;
use crate::vm::trace::TraceEvent;
use crate::vm::value::Value;
use crate::vm::VmResult;

impl<'a> Interpreter<'a> {
    pub(in crate::vm::interpreter) fn exec_object_ops(
        &mut self,
        ctx: &mut ExecutionContext,
        instruction: &Instruction,
    ) -> VmResult<()> {
        let value = match instruction {
            Instruction::PutObject { object } => object.clone(),
            Instruction::PutObjectInt2Fix1 => Value::integer(1),
            _ => unreachable!("Not an object instruction: {:?}", instruction),
        };

        // A push that would overflow dispatches no event.
        ctx.stack().ensure_room()?;
        if instruction.dispatches_line_event() {
            ctx.emit_trace(TraceEvent::Line {
                instruction: instruction.name(),
            });
        }
        ctx.stack_mut().push(value)
    }
}
