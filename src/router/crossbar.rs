/*!

The crossbar moves each granted flit from its inport to the output buffer of its outport. Contention was already resolved by the switch allocator, so this is pure movement: at most one flit per inport per cycle, entering link traversal one cycle later.

*/

use std::mem::size_of;

use crate::event::{Time,Event,EventGeneration,CyclePosition};
use crate::flit::{FlitBuffer,Stage};
use crate::quantify::Quantifiable;
use crate::router::Router;

pub struct CrossbarSwitch
{
	///Flits granted the switch, one buffer per inport.
	pub switch_buffers: Vec<FlitBuffer>,
	pub crossbar_activity: u64,
}

impl CrossbarSwitch
{
	pub fn new() -> CrossbarSwitch
	{
		CrossbarSwitch{
			switch_buffers: vec![],
			crossbar_activity: 0,
		}
	}
	pub fn add_inport(&mut self)
	{
		self.switch_buffers.push(FlitBuffer::new());
	}
}

impl Router
{
	///Move this cycle's granted flits into their output buffers and schedule the link events one cycle hence.
	pub fn crossbar_pass(&mut self, current_cycle:Time) -> Vec<EventGeneration>
	{
		let mut events=vec![];
		for inport in 0..self.crossbar.switch_buffers.len()
		{
			let ready=match self.crossbar.switch_buffers[inport].peek_top_flit()
			{
				Some(flit) => flit.is_stage(Stage::SwitchTraversal,current_cycle),
				None => false,
			};
			if ready
			{
				let mut flit=self.crossbar.switch_buffers[inport].get_top_flit().expect("the buffer was just peeked");
				let outport=flit.outport.expect("a flit traversed the switch without an output port");
				flit.advance_stage(Stage::LinkTraversal,current_cycle+1);
				self.crossbar.crossbar_activity+=1;
				let output_unit=&mut self.output_units[outport];
				let was_empty=output_unit.out_buffer.is_empty();
				output_unit.out_buffer.insert(flit);
				if was_empty
				{
					events.push(EventGeneration{
						delay: 1,
						position: CyclePosition::Begin,
						event: Event::LinkTransfer{link:output_unit.out_link},
					});
				}
			}
		}
		events
	}
}

impl Quantifiable for CrossbarSwitch
{
	fn total_memory(&self) -> usize
	{
		let mut total=size_of::<CrossbarSwitch>();
		for buffer in self.switch_buffers.iter()
		{
			total+=buffer.total_memory();
		}
		total
	}
	fn print_memory_breakdown(&self)
	{
		unimplemented!();
	}
	fn forecast_total_memory(&self) -> usize
	{
		unimplemented!();
	}
}
