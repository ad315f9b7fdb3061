use crate::*;

/// Synchronization commands the barrier pass records. A hardware backend
/// translates these when the command stream is submitted; tests inspect them
/// directly.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BarrierCommand {
  Transition {
    resource: usize,
    from: ResourceState,
    to: ResourceState,
  },
  UavHazard {
    resource: usize,
  },
}

/// The per thread command context all binding mutation and barrier insertion
/// flows through. This layer does no internal locking: concurrent use of one
/// context from multiple threads is the caller's bug to prevent.
#[derive(Default)]
pub struct GPUContext {
  commands: Vec<BarrierCommand>,
}

impl GPUContext {
  pub fn new() -> Self {
    Default::default()
  }

  /// Request a transition of a shared resource into the given state. Returns
  /// true iff the state actually changed and a transition was recorded; a
  /// resource already in the requested state records nothing.
  pub fn resource_barrier(&mut self, resource: &GPUResource, state: ResourceState) -> bool {
    let mut current = resource.state_cell().lock();
    if *current == state {
      return false;
    }
    self.commands.push(BarrierCommand::Transition {
      resource: resource.guid(),
      from: *current,
      to: state,
    });
    *current = state;
    true
  }

  /// Record an explicit read/write hazard barrier for a resource, preventing
  /// unsafe overlap of two dispatches accessing it.
  pub fn uav_barrier(&mut self, resource: &GPUResource) {
    self.commands.push(BarrierCommand::UavHazard {
      resource: resource.guid(),
    });
  }

  pub fn commands(&self) -> &[BarrierCommand] {
    &self.commands
  }

  /// drain the recorded commands, e.g. after a submit consumed them
  pub fn take_commands(&mut self) -> Vec<BarrierCommand> {
    std::mem::take(&mut self.commands)
  }
}
