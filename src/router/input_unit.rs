/*!

Per-inport virtual channel buffers and pipeline bookkeeping.

Each inport holds `virtual_networks * vc_per_vnet` lanes. A head flit claims its lane on arrival and records the routing decision in it; the lane returns to idle when the tail is granted the switch, at which point a credit with the free signal travels back to the sender.

*/

use std::mem::size_of;
use std::rc::Rc;

use crate::event::{Time,Event,EventGeneration,CyclePosition};
use crate::flit::{Credit,CreditQueue,FlitBuffer,Stage};
use crate::network::NetworkParameters;
use crate::quantify::Quantifiable;
use crate::router::VcState;
use crate::topology::PortDirection;

///One virtual channel lane of an inport.
pub struct VirtualChannel
{
	pub buffer: FlitBuffer,
	pub state: VcState,
	///Cycle of the last state change.
	pub state_time: Time,
	///The outport decided by the routing unit for the packet currently in the lane.
	pub outport: Option<usize>,
	///The downstream virtual channel granted by allocation.
	pub outvc: Option<usize>,
	///The virtual channel class decided by the routing unit, kept for adaptive replay.
	pub outvc_class: Option<usize>,
	///Arrival cycle of the head of the packet currently in the lane.
	pub enqueue_time: Time,
}

impl VirtualChannel
{
	fn new() -> VirtualChannel
	{
		VirtualChannel{
			buffer: FlitBuffer::new(),
			state: VcState::Idle,
			state_time: 0,
			outport: None,
			outvc: None,
			outvc_class: None,
			enqueue_time: Time::MAX,
		}
	}
}

pub struct InputUnit
{
	pub id: usize,
	pub direction: PortDirection,
	pub params: Rc<NetworkParameters>,
	pub vcs: Vec<VirtualChannel>,
	///Credits awaiting their trip back to the sender.
	pub credit_queue: CreditQueue,
	///The credit link towards the sender.
	pub credit_link: usize,
}

impl InputUnit
{
	pub fn new(id:usize, direction:PortDirection, credit_link:usize, params:Rc<NetworkParameters>) -> InputUnit
	{
		let num_vcs=params.num_vcs();
		InputUnit{
			id,
			direction,
			params,
			vcs: (0..num_vcs).map(|_|VirtualChannel::new()).collect(),
			credit_queue: CreditQueue::new(),
			credit_link,
		}
	}
	///Claim the lane for an arriving head flit.
	pub fn begin_packet(&mut self, vc:usize, current_cycle:Time)
	{
		let lane=&mut self.vcs[vc];
		assert_eq!( lane.state, VcState::Idle, "a head flit arrived to a busy virtual channel" );
		assert!( lane.buffer.is_empty() );
		lane.state=VcState::Active;
		lane.state_time=current_cycle;
		lane.enqueue_time=current_cycle;
		lane.outport=None;
		lane.outvc=None;
		lane.outvc_class=None;
	}
	///Whether the lane's front flit waits in the given stage at the given cycle.
	pub fn need_stage(&self, vc:usize, stage:Stage, time:Time) -> bool
	{
		match self.vcs[vc].buffer.peek_top_flit()
		{
			Some(flit) => flit.is_stage(stage,time),
			None => false,
		}
	}
	pub fn get_outport(&self, vc:usize) -> Option<usize>
	{
		self.vcs[vc].outport
	}
	pub fn get_outvc(&self, vc:usize) -> Option<usize>
	{
		self.vcs[vc].outvc
	}
	pub fn get_outvc_class(&self, vc:usize) -> Option<usize>
	{
		self.vcs[vc].outvc_class
	}
	pub fn get_enqueue_time(&self, vc:usize) -> Time
	{
		self.vcs[vc].enqueue_time
	}
	///Record the outport decided by the routing unit for the packet in the lane.
	pub fn grant_outport(&mut self, vc:usize, outport:usize)
	{
		self.vcs[vc].outport=Some(outport);
	}
	///Record the downstream virtual channel granted to the packet in the lane.
	///Reached both from the allocator and from the credit wake-up reactivation.
	pub fn grant_outvc(&mut self, vc:usize, outvc:usize)
	{
		self.vcs[vc].outvc=Some(outvc);
	}
	pub fn grant_outvc_class(&mut self, vc:usize, outvc_class:usize)
	{
		self.vcs[vc].outvc_class=Some(outvc_class);
	}
	///Read the front flit out of the lane.
	pub fn get_top_flit(&mut self, vc:usize) -> Option<crate::flit::Flit>
	{
		self.vcs[vc].buffer.get_top_flit()
	}
	pub fn is_ready(&self, vc:usize, time:Time) -> bool
	{
		self.vcs[vc].buffer.is_ready(time)
	}
	///Return the lane to idle once its tail has been granted the switch.
	pub fn set_vc_idle(&mut self, vc:usize, current_cycle:Time)
	{
		let lane=&mut self.vcs[vc];
		lane.state=VcState::Idle;
		lane.state_time=current_cycle;
		lane.enqueue_time=Time::MAX;
		lane.outport=None;
		lane.outvc=None;
		lane.outvc_class=None;
	}
	///Send a credit for a departed flit back to the sender, freeing one buffer slot there.
	///With `is_free_signal` the whole lane is reported empty, permitting its reallocation.
	pub fn increment_credit(&mut self, vc:usize, is_free_signal:bool, current_cycle:Time) -> Vec<EventGeneration>
	{
		let was_empty=self.credit_queue.is_empty();
		self.credit_queue.insert(Credit{vc,is_free_signal},current_cycle+1);
		if was_empty
		{
			vec![EventGeneration{
				delay: 1,
				position: CyclePosition::Begin,
				event: Event::CreditLinkTransfer{link:self.credit_link},
			}]
		}
		else
		{
			vec![]
		}
	}
}

impl Quantifiable for InputUnit
{
	fn total_memory(&self) -> usize
	{
		let mut total=size_of::<InputUnit>()+self.credit_queue.total_memory();
		for lane in self.vcs.iter()
		{
			total+=size_of::<VirtualChannel>()+lane.buffer.total_memory();
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
