/*!

The units moving through the network: flits forward, credits backward.

A packet is a contiguous ordered sequence of flits with exactly one `Head` (or `HeadTail`) and one `Tail` (or `HeadTail`) and zero or more `Body` between. All flits of one packet share packet id, source, destination, and virtual network.

*/

use std::collections::VecDeque;
use std::mem::size_of;
use std::rc::Rc;

use quantifiable_derive::Quantifiable;//the derive macro
use crate::event::Time;
use crate::quantify::Quantifiable;
use crate::Message;

#[derive(Clone,Copy,PartialEq,Eq,Debug)]
pub enum FlitType
{
	Head,
	Body,
	Tail,
	HeadTail,
}

impl FlitType
{
	///Whether a flit of this type opens a packet and undergoes route computation.
	pub fn is_head(self) -> bool
	{
		self==FlitType::Head || self==FlitType::HeadTail
	}
	///Whether a flit of this type closes a packet and frees its virtual channel.
	pub fn is_tail(self) -> bool
	{
		self==FlitType::Tail || self==FlitType::HeadTail
	}
}

///The pipeline stage a flit is currently in, together with the cycle at which it entered it.
#[derive(Clone,Copy,PartialEq,Eq,Debug)]
pub enum Stage
{
	Idle,
	RouteCompute,
	SwitchAllocation,
	SwitchTraversal,
	LinkTraversal,
}

///The route record carried by every flit of a packet.
///`dr` and `misrouting` only increase over the life of a flit.
#[derive(Clone,Debug,Quantifiable)]
pub struct RouteInfo
{
	pub src_router: usize,
	pub dest_router: usize,
	///Every node that may consume the packet.
	pub dest_nodes: Vec<usize>,
	pub vnet: usize,
	///Number of dimension reversals performed so far.
	pub dr: u32,
	///Number of hops taken through a dimension whose digit already matched the destination.
	pub misrouting: u32,
	///Router-to-router hops traversed.
	pub hops: u32,
}

///A fixed-size transmission unit.
#[derive(Clone,Debug)]
pub struct Flit
{
	pub packet_id: u64,
	///Position inside the packet.
	pub index: usize,
	pub flit_type: FlitType,
	pub vnet: usize,
	///Number of flits in the packet.
	pub packet_size: usize,
	///Node that created the packet.
	pub source: usize,
	///Node the packet is headed to.
	pub destination: usize,
	pub route: RouteInfo,
	///The output port decided by the routing unit; updated at every router.
	pub outport: Option<usize>,
	///The virtual channel the flit travels in; on a router it is the downstream channel granted by allocation.
	pub vc: Option<usize>,
	pub stage: Stage,
	///The cycle at which the flit entered its current stage.
	pub stage_time: Time,
	///The cycle the flit was created at the source interface.
	pub enqueue_time: Time,
	///Cycles the message waited at the source interface before being flitisized.
	pub queueing_delay: Time,
	///The message the flit carries a portion of.
	pub message: Rc<Message>,
}

impl Flit
{
	pub fn advance_stage(&mut self, stage:Stage, time:Time)
	{
		self.stage=stage;
		self.stage_time=time;
	}
	///Whether the flit is in the given stage and its entry cycle has been reached.
	pub fn is_stage(&self, stage:Stage, time:Time) -> bool
	{
		self.stage==stage && self.stage_time<=time
	}
	#[cfg(test)]
	pub fn dummy() -> Flit
	{
		Flit{
			packet_id: 0,
			index: 0,
			flit_type: FlitType::HeadTail,
			vnet: 0,
			packet_size: 1,
			source: 0,
			destination: 0,
			route: RouteInfo{ src_router:0, dest_router:0, dest_nodes:vec![0], vnet:0, dr:0, misrouting:0, hops:0 },
			outport: None,
			vc: Some(0),
			stage: Stage::Idle,
			stage_time: 0,
			enqueue_time: 0,
			queueing_delay: 0,
			message: Rc::new(Message{ origin:0, destinations:vec![0], vnet:0, size:1, creation_cycle:0, payload:vec![] }),
		}
	}
}

///A back-pressure token returned upstream for a freed buffer slot.
///`is_free_signal` indicates the virtual channel has just emptied, permitting reallocation.
#[derive(Clone,Copy,Debug)]
pub struct Credit
{
	pub vc: usize,
	pub is_free_signal: bool,
}

///An ordered holding queue of flits.
pub struct FlitBuffer
{
	flits: VecDeque<Flit>,
}

impl FlitBuffer
{
	pub fn new() -> FlitBuffer
	{
		FlitBuffer{ flits: VecDeque::new() }
	}
	pub fn insert(&mut self, flit:Flit)
	{
		self.flits.push_back(flit);
	}
	pub fn peek_top_flit(&self) -> Option<&Flit>
	{
		self.flits.front()
	}
	pub fn get_top_flit(&mut self) -> Option<Flit>
	{
		self.flits.pop_front()
	}
	///Whether the front flit has reached its stage-entry cycle.
	pub fn is_ready(&self, time:Time) -> bool
	{
		match self.flits.front()
		{
			Some(flit) => flit.stage_time<=time,
			None => false,
		}
	}
	pub fn len(&self) -> usize
	{
		self.flits.len()
	}
	pub fn is_empty(&self) -> bool
	{
		self.flits.is_empty()
	}
	pub fn iter(&self) -> impl Iterator<Item=&Flit>
	{
		self.flits.iter()
	}
}

///Credits waiting to be sent over a credit link, stamped with the cycle at which they become ready.
pub struct CreditQueue
{
	credits: VecDeque<(Credit,Time)>,
}

impl CreditQueue
{
	pub fn new() -> CreditQueue
	{
		CreditQueue{ credits: VecDeque::new() }
	}
	pub fn insert(&mut self, credit:Credit, ready:Time)
	{
		self.credits.push_back((credit,ready));
	}
	///Extract the front credit if its ready cycle has been reached.
	pub fn pop_ready(&mut self, time:Time) -> Option<Credit>
	{
		match self.credits.front()
		{
			Some(&(_,ready)) if ready<=time => self.credits.pop_front().map(|p|p.0),
			_ => None,
		}
	}
	pub fn len(&self) -> usize
	{
		self.credits.len()
	}
	pub fn is_empty(&self) -> bool
	{
		self.credits.is_empty()
	}
}

impl Quantifiable for FlitType
{
	fn total_memory(&self) -> usize
	{
		size_of::<FlitType>()
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

impl Quantifiable for Flit
{
	fn total_memory(&self) -> usize
	{
		size_of::<Flit>() + self.route.dest_nodes.capacity()*size_of::<usize>()
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

impl Quantifiable for Credit
{
	fn total_memory(&self) -> usize
	{
		size_of::<Credit>()
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

impl Quantifiable for FlitBuffer
{
	fn total_memory(&self) -> usize
	{
		//We add +1 because of one hole in the implementation of VecDeque.
		let mut total=size_of::<FlitBuffer>() + (self.flits.capacity()+1-self.flits.len())*size_of::<Flit>();
		for flit in self.flits.iter()
		{
			total+=flit.total_memory();
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

impl Quantifiable for CreditQueue
{
	fn total_memory(&self) -> usize
	{
		size_of::<CreditQueue>() + (self.credits.capacity()+1)*size_of::<(Credit,Time)>()
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

#[cfg(test)]
mod tests
{
	use super::*;
	#[test]
	fn buffer_readiness()
	{
		let mut buffer=FlitBuffer::new();
		assert!( !buffer.is_ready(100) );
		let mut flit=Flit::dummy();
		flit.advance_stage(Stage::SwitchAllocation,5);
		buffer.insert(flit);
		assert!( !buffer.is_ready(4) );
		assert!( buffer.is_ready(5) );
		assert!( buffer.is_ready(6) );
		let front=buffer.peek_top_flit().unwrap();
		assert!( front.is_stage(Stage::SwitchAllocation,5) );
		assert!( !front.is_stage(Stage::SwitchTraversal,5) );
		assert_eq!( buffer.len(), 1 );
		let taken=buffer.get_top_flit().unwrap();
		assert_eq!( taken.stage_time, 5 );
		assert!( buffer.is_empty() );
	}
	#[test]
	fn credit_queue_order()
	{
		let mut queue=CreditQueue::new();
		queue.insert(Credit{vc:3,is_free_signal:false},10);
		queue.insert(Credit{vc:4,is_free_signal:true},11);
		assert!( queue.pop_ready(9).is_none() );
		let first=queue.pop_ready(10).unwrap();
		assert_eq!( first.vc, 3 );
		//The second is not ready yet even though the queue is not empty.
		assert!( queue.pop_ready(10).is_none() );
		let second=queue.pop_ready(11).unwrap();
		assert!( second.is_free_signal );
		assert!( queue.is_empty() );
	}
}
