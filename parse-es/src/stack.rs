//! Native stack accounting for the recursive parser and evaluator.
//!
//! Both walk nested syntax by recursion, so a deeply nested script can exhaust the thread's stack long before any count of nesting levels is reached, especially in unoptimized builds where frames are large. The outermost [`StackBase`] on a thread records where recursion began; [`stack_used`] measures from there, so a parse started from inside a running script shares the script's budget.

use std::cell::Cell;
use std::marker::PhantomData;

/// Bytes of stack a parse or evaluation may use by default. Half of the 2 MiB Rust gives spawned threads, leaving the rest to the host.
pub const DEFAULT_STACK_BUDGET: usize = 1 << 20;

thread_local! {
  // Address near the start of the outermost recursion on this thread. Zero when none is running.
  static BASE: Cell<usize> = const { Cell::new(0) };
}

#[inline(never)]
fn stack_address() -> usize {
  let marker = 0u8;
  std::hint::black_box(&marker) as *const u8 as usize
}

/// Marks the start of a recursive walk on this thread for the lifetime of the guard. Only the outermost guard records a base.
pub struct StackBase {
  owner: bool,
  // The base belongs to the thread that set it.
  _thread: PhantomData<*const ()>,
}

impl StackBase {
  pub fn enter() -> StackBase {
    let owner = BASE.with(|base| {
      if base.get() != 0 {
        return false;
      };
      base.set(stack_address());
      true
    });
    StackBase {
      owner,
      _thread: PhantomData,
    }
  }
}

impl Drop for StackBase {
  fn drop(&mut self) {
    if self.owner {
      BASE.with(|base| base.set(0));
    };
  }
}

/// Bytes of stack used since the outermost [`StackBase`] on this thread, or zero outside of one.
pub fn stack_used() -> usize {
  match BASE.with(Cell::get) {
    0 => 0,
    base => base.abs_diff(stack_address()),
  }
}

#[cfg(test)]
mod tests {
  use super::stack_used;
  use super::StackBase;

  // Recurses with a 256 byte local per level and reports the usage at the bottom.
  fn nest(levels: u32) -> usize {
    let pad = std::hint::black_box([0u8; 256]);
    let used = if levels == 0 { stack_used() } else { nest(levels - 1) };
    used + usize::from(std::hint::black_box(pad)[0])
  }

  #[test]
  fn test_outside_a_base_nothing_is_used() {
    assert_eq!(stack_used(), 0);
  }

  #[test]
  fn test_usage_grows_with_recursion() {
    let _base = StackBase::enter();
    let shallow = nest(1);
    let deep = nest(64);
    assert!(deep > shallow + 64 * 256);
  }

  #[test]
  fn test_nested_bases_share_the_outer_one() {
    let outer = StackBase::enter();
    let before = nest(32);
    {
      let _inner = StackBase::enter();
      assert_eq!(nest(32), before);
    }
    assert!(stack_used() > 0);
    drop(outer);
    assert_eq!(stack_used(), 0);
  }
}
