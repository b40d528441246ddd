
use std::convert::TryInto;
use std::mem::size_of;

use crate::flit::{Flit,Credit};
use crate::quantify::Quantifiable;

/// An amount of cycles.
pub type Time = u64;

///The events stored in the event queue.
///All of them are typed and indexed; components live in flat collections owned by the `Network` and never hold references to each other.
#[derive(Debug)]
pub enum Event
{
	///A flit arrives to the given inport of a router.
	FlitToRouter{
		flit: Flit,
		router: usize,
		port: usize,
	},
	///A flit arrives to the reception side of a network interface.
	FlitToInterface{
		flit: Flit,
		interface: usize,
	},
	///A credit arrives to the given outport of a router.
	CreditToRouter{
		credit: Credit,
		router: usize,
		port: usize,
	},
	///A credit arrives to the emission side of a network interface.
	CreditToInterface{
		credit: Credit,
		interface: usize,
	},
	///A network link moves one ready flit out of its source buffer.
	LinkTransfer{
		link: usize,
	},
	///A credit link moves one ready credit out of its source queue.
	CreditLinkTransfer{
		link: usize,
	},
	///A router performs its allocation cycle.
	ProcessRouter{
		router: usize,
	},
	///A network interface packetizes pending messages and feeds its output link.
	ProcessInterface{
		interface: usize,
	},
}

///This is used to sort the processing of the events inside a cycle.
///If some event occurs at Begin then its result will be visible for events at End. Specifically, we ensure that all the flits and credits have arrived before arbitrating.
///Currently at Begin: flit and credit deliveries plus link transfers.
///Currently at End: router and interface processing.
pub enum CyclePosition
{
	Begin,
	End,
}

///Encapsulates a request for insertion on the event queue.
pub struct EventGeneration
{
	///To insert the event after `delay` cycles.
	pub delay: Time,
	///Whether the event should be processed at the begin or the end of its cycle.
	pub position: CyclePosition,
	///The actual event to be inserted.
	pub event: Event,
}

///The event queue structure managing the insertion and extraction of events.
pub struct EventQueue
{
	event_begin_circle: Vec<Vec<Event>>,//Events to be processed at the beginning of a cycle (mostly arrivals of flits)
	event_end_circle: Vec<Vec<Event>>,//Events to be processed at the end of a cycle (mostly decisions on where to send flits)
	//offset currently being accessed.
	current: usize,
}

impl EventQueue
{
	///Creates a new EventQueue. `size` should be greater than any possible delay.
	pub fn new (size:usize) -> EventQueue
	{
		EventQueue{
			event_begin_circle: (0..size).map(|_| Vec::new()).collect(),
			event_end_circle: (0..size).map(|_| Vec::new()).collect(),
			current:0,
		}
	}
	///Advances the queue by a cycle. The events in the finished cycle must have been taken already.
	pub fn advance(&mut self)
	{
		assert!( self.event_begin_circle[self.current].is_empty() && self.event_end_circle[self.current].is_empty(), "advancing the event queue with pending events" );
		self.current=(self.current+1)%self.event_begin_circle.len();
	}
	///Extract the events to be executed at the begin of the current cycle.
	///Events enqueued with zero delay while processing the batch land in a later take; the caller loops until empty.
	pub fn take_begin(&mut self) -> Vec<Event>
	{
		std::mem::take(&mut self.event_begin_circle[self.current])
	}
	///Extract the events to be executed at the end of the current cycle.
	pub fn take_end(&mut self) -> Vec<Event>
	{
		std::mem::take(&mut self.event_end_circle[self.current])
	}
	///Adds an event to the list of events to be executed at the begin of the cycle `current_cycle + delay`.
	pub fn enqueue_begin(&mut self, event:Event, delay: Time)
	{
		let delay : usize = delay.try_into().unwrap();
		if delay>=self.event_begin_circle.len()
		{
			panic!("Delay too long");
		}
		let position=(self.current+delay) % self.event_begin_circle.len();
		self.event_begin_circle[position].push(event);
	}
	///Adds an event to the list of events to be executed at the end of the cycle `current_cycle + delay`.
	pub fn enqueue_end(&mut self, event:Event, delay: Time)
	{
		let delay : usize = delay.try_into().unwrap();
		if delay>=self.event_end_circle.len()
		{
			panic!("Delay too long");
		}
		let position=(self.current+delay) % self.event_end_circle.len();
		self.event_end_circle[position].push(event);
	}
	///Adds an event as it requests.
	pub fn enqueue(&mut self, event_generation:EventGeneration)
	{
		match event_generation.position
		{
			CyclePosition::Begin => self.enqueue_begin(event_generation.event,event_generation.delay),
			CyclePosition::End => self.enqueue_end(event_generation.event,event_generation.delay),
		};
	}
}

impl Quantifiable for EventQueue
{
	fn total_memory(&self) -> usize
	{
		let mut total=size_of::<EventQueue>();
		for circle in [&self.event_begin_circle,&self.event_end_circle]
		{
			for slot in circle.iter()
			{
				total+=slot.capacity()*size_of::<Event>();
			}
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

#[cfg(test)]
mod tests
{
	use super::*;
	#[test]
	fn circular_delays()
	{
		let mut queue=EventQueue::new(4);
		queue.enqueue_begin(Event::ProcessRouter{router:0},0);
		queue.enqueue_begin(Event::ProcessRouter{router:1},1);
		queue.enqueue_end(Event::ProcessRouter{router:2},1);
		let now=queue.take_begin();
		assert_eq!( now.len(), 1 );
		assert!( matches!(now[0],Event::ProcessRouter{router:0}) );
		assert!( queue.take_begin().is_empty() );
		assert!( queue.take_end().is_empty() );
		queue.advance();
		assert_eq!( queue.take_begin().len(), 1 );
		assert_eq!( queue.take_end().len(), 1 );
	}
	#[test]
	#[should_panic]
	fn excessive_delay()
	{
		let mut queue=EventQueue::new(4);
		queue.enqueue_begin(Event::ProcessRouter{router:0},4);
	}
	#[test]
	fn same_cycle_cascade()
	{
		let mut queue=EventQueue::new(2);
		queue.enqueue_begin(Event::LinkTransfer{link:0},0);
		let first=queue.take_begin();
		assert_eq!( first.len(), 1 );
		//An event generated while processing the batch is seen by a later take of the same cycle.
		queue.enqueue_begin(Event::FlitToRouter{flit:crate::flit::Flit::dummy(),router:0,port:0},0);
		let second=queue.take_begin();
		assert_eq!( second.len(), 1 );
		assert!( queue.take_begin().is_empty() );
	}
}
