/*!

Per-outport bookkeeping of the downstream virtual channels.

The credit counters mirror the free buffer slots of the input unit at the other end of the link. The waiting queues drive the deferred channel assignment of the adaptive routing algorithms: the head of a queue is the packet currently holding the channel, later entries wait for it; when the free signal arrives the head is popped and the next waiter is granted the channel.

*/

use std::collections::VecDeque;
use std::mem::size_of;
use std::rc::Rc;

use crate::event::Time;
use crate::flit::FlitBuffer;
use crate::network::{NetworkParameters,RoutingAlgorithm};
use crate::quantify::Quantifiable;
use crate::router::VcState;
use crate::topology::PortDirection;

///State of one downstream virtual channel.
pub struct OutVcState
{
	pub state: VcState,
	///Cycle of the last state change.
	pub state_time: Time,
	///Free buffer slots known to remain in the downstream lane.
	pub credits: usize,
}

impl OutVcState
{
	pub fn new(credits:usize) -> OutVcState
	{
		OutVcState{
			state: VcState::Idle,
			state_time: 0,
			credits,
		}
	}
}

///An entry of a waiting queue: the input lane that was granted the channel, plus its dimension-reversal count on arrival for the priority checks.
#[derive(Clone,Copy,Debug)]
pub struct Waiter
{
	pub inport: usize,
	pub invc: usize,
	pub dr: u32,
}

///The holder and waiters of one downstream virtual channel, in grant order.
pub struct WaitingQueue
{
	queue: VecDeque<Waiter>,
}

impl WaitingQueue
{
	pub fn new() -> WaitingQueue
	{
		WaitingQueue{ queue: VecDeque::new() }
	}
	pub fn len(&self) -> usize
	{
		self.queue.len()
	}
	pub fn is_empty(&self) -> bool
	{
		self.queue.is_empty()
	}
	pub fn enqueue(&mut self, inport:usize, invc:usize, dr:u32)
	{
		self.queue.push_back(Waiter{inport,invc,dr});
	}
	pub fn peek(&self) -> Option<Waiter>
	{
		self.queue.front().copied()
	}
	pub fn dequeue(&mut self) -> Option<Waiter>
	{
		self.queue.pop_front()
	}
}

pub struct OutputUnit
{
	pub id: usize,
	pub direction: PortDirection,
	pub params: Rc<NetworkParameters>,
	///State of the downstream virtual channels.
	pub vc_states: Vec<OutVcState>,
	///Waiting queue per downstream virtual channel, used by the adaptive algorithms.
	pub waiting_queues: Vec<WaitingQueue>,
	///Flits ready for the network link to consume.
	pub out_buffer: FlitBuffer,
	pub out_link: usize,
	pub credit_link: usize,
}

impl OutputUnit
{
	pub fn new(id:usize, direction:PortDirection, out_link:usize, credit_link:usize, params:Rc<NetworkParameters>) -> OutputUnit
	{
		let num_vcs=params.num_vcs();
		let vc_states=(0..num_vcs).map(|vc|OutVcState::new(params.buffers_per_vc(vc/params.vc_per_vnet))).collect();
		OutputUnit{
			id,
			direction,
			params,
			vc_states,
			waiting_queues: (0..num_vcs).map(|_|WaitingQueue::new()).collect(),
			out_buffer: FlitBuffer::new(),
			out_link,
			credit_link,
		}
	}
	pub fn decrement_credit(&mut self, vc:usize)
	{
		assert!( self.vc_states[vc].credits>0, "sending a flit without credit" );
		self.vc_states[vc].credits-=1;
	}
	pub fn increment_credit(&mut self, vc:usize)
	{
		self.vc_states[vc].credits+=1;
	}
	///Whether the downstream lane has a free buffer slot.
	pub fn has_credit(&self, vc:usize) -> bool
	{
		assert_eq!( self.vc_states[vc].state, VcState::Active, "querying credits of an unallocated channel" );
		self.vc_states[vc].credits>0
	}
	pub fn is_vc_idle(&self, vc:usize) -> bool
	{
		self.vc_states[vc].state==VcState::Idle
	}
	pub fn set_vc_idle(&mut self, vc:usize, current_cycle:Time)
	{
		self.vc_states[vc].state=VcState::Idle;
		self.vc_states[vc].state_time=current_cycle;
	}
	pub fn set_vc_active(&mut self, vc:usize, current_cycle:Time)
	{
		self.vc_states[vc].state=VcState::Active;
		self.vc_states[vc].state_time=current_cycle;
	}
	///A channel is free for a fresh packet when it is idle and nobody holds or awaits it.
	pub fn has_free_vc(&self, range:std::ops::Range<usize>) -> bool
	{
		range.into_iter().any(|vc|self.is_vc_idle(vc) && self.waiting_queues[vc].is_empty())
	}
	///Choose the first free channel of the range and activate it.
	pub fn select_free_vc(&mut self, range:std::ops::Range<usize>, current_cycle:Time) -> Option<usize>
	{
		for vc in range
		{
			if self.is_vc_idle(vc) && self.waiting_queues[vc].is_empty()
			{
				self.set_vc_active(vc,current_cycle);
				return Some(vc);
			}
		}
		None
	}
	pub fn get_free_vc_count(&self, range:std::ops::Range<usize>) -> usize
	{
		range.into_iter().filter(|&vc|self.is_vc_idle(vc) && self.waiting_queues[vc].is_empty()).count()
	}
	///Whether a packet with the given dimension-reversal count may hold or wait on the channel.
	///Under the static algorithm waiters queue behind the holder unconditionally; under the dynamic one only behind a holder with a strictly greater count.
	pub fn is_legal(&self, vc:usize, dr:u32, algorithm:RoutingAlgorithm) -> bool
	{
		debug_assert!( algorithm==RoutingAlgorithm::StaticAdaptive || algorithm==RoutingAlgorithm::DynamicAdaptive );
		if algorithm==RoutingAlgorithm::StaticAdaptive || self.waiting_queues[vc].is_empty()
		{
			true
		}
		else
		{
			self.waiting_queues[vc].peek().expect("the queue is not empty").dr>dr
		}
	}
	pub fn has_legal_vc(&self, range:std::ops::Range<usize>, dr:u32, algorithm:RoutingAlgorithm) -> bool
	{
		range.into_iter().any(|vc|self.is_legal(vc,dr,algorithm))
	}
	///The legal channel with the shortest waiting queue, ties broken by first occurrence.
	pub fn select_legal_vc(&self, range:std::ops::Range<usize>, dr:u32, algorithm:RoutingAlgorithm) -> Option<usize>
	{
		let mut best:Option<usize>=None;
		for vc in range
		{
			if self.is_legal(vc,dr,algorithm)
			{
				match best
				{
					Some(b) if self.waiting_queues[b].len()<=self.waiting_queues[vc].len() => (),
					_ => best=Some(vc),
				}
			}
		}
		best
	}
	pub fn get_min_waiting_length(&self, range:std::ops::Range<usize>, dr:u32, algorithm:RoutingAlgorithm) -> usize
	{
		range.into_iter().filter(|&vc|self.is_legal(vc,dr,algorithm)).map(|vc|self.waiting_queues[vc].len()).min().unwrap_or(usize::MAX)
	}
	///Record a holder or waiter of the channel.
	pub fn enqueue_waiting_queue(&mut self, vc:usize, inport:usize, invc:usize, dr:u32)
	{
		self.waiting_queues[vc].enqueue(inport,invc,dr);
	}
}

impl Quantifiable for OutputUnit
{
	fn total_memory(&self) -> usize
	{
		let mut total=size_of::<OutputUnit>()+self.out_buffer.total_memory();
		total+=self.vc_states.capacity()*size_of::<OutVcState>();
		for queue in self.waiting_queues.iter()
		{
			total+=size_of::<WaitingQueue>()+(queue.queue.capacity()+1)*size_of::<Waiter>();
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
