use crate::compiler::Instruction;
use crate::vm::context::ExecutionContext;
use crate::vm::interpreter::Interpreter;
use crate::vm::VmResult;
use tracing::debug;

impl<'a> Interpreter<'a> {
    pub(in crate::vm::interpreter) fn exec_cache_ops(
        &mut self,
        ctx: &mut ExecutionContext,
        instruction: &Instruction,
    ) -> VmResult<()> {
        match instruction {
            Instruction::OptSetInlineCache { cache } => {
                if !ctx.options().inline_caching {
                    return Ok(());
                }

                // Each resolution finalizes at most one slot.
                let Some(resolved) = ctx.take_last_constant() else {
                    return Ok(());
                };
                debug!(
                    cache = *cache,
                    constant = &*resolved.name,
                    serial = resolved.serial,
                    "inline cache filled"
                );
                ctx.inline_caches_mut()
                    .store(*cache, resolved.value, resolved.serial);
                Ok(())
            }

            _ => unreachable!("Not a cache instruction: {:?}", instruction),
        }
    }
}
