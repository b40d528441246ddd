/*!

The endpoints of the network: packet to flit serialization on the way in, reassembly on the way out.

The emission side mirrors the state of the router's input lanes with per-channel credit counters, exactly as an output unit does. Messages wait per vnet until a channel of their vnet is idle; at most one flit per cycle enters the link. The reception side consumes flits on arrival, returns a credit for each one, and delivers the reassembled message when the tail shows up.

*/

use std::collections::{BTreeMap,VecDeque};
use std::mem::size_of;
use std::rc::Rc;

use crate::event::{Time,Event,EventGeneration,CyclePosition};
use crate::flit::{Credit,CreditQueue,Flit,FlitBuffer,FlitType,Stage,RouteInfo};
use crate::measures::Statistics;
use crate::network::NetworkParameters;
use crate::quantify::Quantifiable;
use crate::router::VcState;
use crate::router::output_unit::OutVcState;
use crate::Message;

pub struct NetworkInterface
{
	///The index of the interface, which is also its node id.
	pub id: usize,
	///The router the interface hangs from.
	pub router: usize,
	pub params: Rc<NetworkParameters>,
	///Messages accepted from the producer and not yet flitisized, per vnet, in insertion order.
	pub pending_messages: Vec<VecDeque<Rc<Message>>>,
	///One flit queue per virtual channel on the way into the network.
	pub out_vcs: Vec<FlitBuffer>,
	///Mirror of the state of the router's input lanes.
	pub out_vc_states: Vec<OutVcState>,
	///Per-vnet round-robin pointer for channel allocation.
	pub vc_allocator: Vec<usize>,
	///Round-robin pointer over the channels feeding the output link.
	pub vc_round_robin: usize,
	///The flit the output link is about to take.
	pub out_buffer: FlitBuffer,
	pub out_link: usize,
	///Credits for consumed flits awaiting their trip back to the router.
	pub credit_queue: CreditQueue,
	pub credit_link: usize,
	///Flits seen so far of each packet being reassembled.
	pub reassembly: BTreeMap<u64,usize>,
	///Reassembled messages ready for the consumer.
	pub received_messages: VecDeque<Rc<Message>>,
	///The cycle for which a `ProcessInterface` event is already enqueued, if any.
	pub pending_process: Option<Time>,
}

impl NetworkInterface
{
	pub fn new(id:usize, router:usize, params:Rc<NetworkParameters>) -> NetworkInterface
	{
		let num_vcs=params.num_vcs();
		let out_vc_states=(0..num_vcs).map(|vc|OutVcState::new(params.buffers_per_vc(vc/params.vc_per_vnet))).collect();
		NetworkInterface{
			id,
			router,
			pending_messages: (0..params.virtual_networks).map(|_|VecDeque::new()).collect(),
			out_vcs: (0..num_vcs).map(|_|FlitBuffer::new()).collect(),
			out_vc_states,
			vc_allocator: vec![0;params.virtual_networks],
			vc_round_robin: 0,
			out_buffer: FlitBuffer::new(),
			out_link: 0,
			credit_queue: CreditQueue::new(),
			credit_link: 0,
			reassembly: BTreeMap::new(),
			received_messages: VecDeque::new(),
			pending_process: None,
			params,
		}
	}
	///Accept a message from the producer. It will be flitisized once a channel of its vnet frees, not before its creation cycle.
	pub fn queue_message(&mut self, message:Rc<Message>)
	{
		let vnet=message.vnet;
		assert!( vnet<self.params.virtual_networks, "message for a virtual network that does not exist" );
		self.pending_messages[vnet].push_back(message);
	}
	///Request a `ProcessInterface` event at `current_cycle+delay` unless an earlier one is enqueued.
	pub fn schedule_process(&mut self, current_cycle:Time, delay:Time) -> Option<EventGeneration>
	{
		let target=current_cycle+delay;
		match self.pending_process
		{
			Some(cycle) if cycle<=target => None,
			_ =>
			{
				self.pending_process=Some(target);
				Some(EventGeneration{
					delay,
					position: CyclePosition::End,
					event: Event::ProcessInterface{interface:self.id},
				})
			}
		}
	}
	///Round-robin choice of an idle channel within the vnet.
	fn calculate_vc(&mut self, vnet:usize, current_cycle:Time) -> Option<usize>
	{
		let vc_per_vnet=self.params.vc_per_vnet;
		let base=vnet*vc_per_vnet;
		for delta in 0..vc_per_vnet
		{
			let offset=(self.vc_allocator[vnet]+delta)%vc_per_vnet;
			let vc=base+offset;
			if self.out_vc_states[vc].state==VcState::Idle
			{
				self.vc_allocator[vnet]=(offset+1)%vc_per_vnet;
				self.out_vc_states[vc].state=VcState::Active;
				self.out_vc_states[vc].state_time=current_cycle;
				return Some(vc);
			}
		}
		None
	}
	///Break a message into flits on the chosen channel.
	fn flitisize(&mut self, message:&Rc<Message>, vc:usize, current_cycle:Time, packet_id:u64)
	{
		let params=&self.params;
		let num_flits=std::cmp::max(1,(message.size+params.ni_flit_size-1)/params.ni_flit_size);
		let destination=*message.destinations.first().expect("a message without destination");
		//One interface per router: node ids and router ids coincide.
		let dest_router=destination;
		for index in 0..num_flits
		{
			let flit_type=match (index==0,index==num_flits-1)
			{
				(true,true) => FlitType::HeadTail,
				(true,false) => FlitType::Head,
				(false,true) => FlitType::Tail,
				(false,false) => FlitType::Body,
			};
			let mut flit=Flit{
				packet_id,
				index,
				flit_type,
				vnet: message.vnet,
				packet_size: num_flits,
				source: self.id,
				destination,
				route: RouteInfo{
					src_router: self.router,
					dest_router,
					dest_nodes: message.destinations.clone(),
					vnet: message.vnet,
					dr: 0,
					misrouting: 0,
					hops: 0,
				},
				outport: None,
				vc: Some(vc),
				stage: Stage::Idle,
				stage_time: current_cycle,
				enqueue_time: current_cycle,
				queueing_delay: current_cycle-message.creation_cycle,
				message: message.clone(),
			};
			flit.advance_stage(Stage::LinkTraversal,current_cycle+1);
			self.out_vcs[vc].insert(flit);
		}
	}
	///The per-cycle work of the emission side: flitisize due messages onto idle channels, then feed the output link one flit, credits permitting.
	pub fn process(&mut self, current_cycle:Time, next_packet_id:&mut u64, statistics:&mut Statistics) -> Vec<EventGeneration>
	{
		//Stale events from a rescheduling to an earlier cycle must do nothing, or the link would take two flits in one cycle.
		match self.pending_process
		{
			Some(cycle) if cycle==current_cycle => self.pending_process=None,
			_ => return vec![],
		}
		let mut events=vec![];
		for vnet in 0..self.params.virtual_networks
		{
			loop
			{
				let due=match self.pending_messages[vnet].front()
				{
					Some(message) => message.creation_cycle<=current_cycle,
					None => false,
				};
				if !due
				{
					break;
				}
				let vc=match self.calculate_vc(vnet,current_cycle)
				{
					Some(vc) => vc,
					None => break,
				};
				let message=self.pending_messages[vnet].pop_front().expect("the front was just seen");
				let packet_id=*next_packet_id;
				*next_packet_id+=1;
				let num_flits=std::cmp::max(1,(message.size+self.params.ni_flit_size-1)/self.params.ni_flit_size);
				statistics.track_injected_packet(vnet,num_flits);
				self.flitisize(&message,vc,current_cycle,packet_id);
			}
		}
		events.extend(self.feed_output_link(current_cycle));
		//Decide when to look again: immediately while there is work, at the next creation cycle if everything pending is future-dated.
		let buffered=self.out_vcs.iter().any(|buffer|!buffer.is_empty());
		let due_message=self.pending_messages.iter().any(|queue|match queue.front()
		{
			Some(message) => message.creation_cycle<=current_cycle+1,
			None => false,
		});
		if buffered || due_message
		{
			events.extend(self.schedule_process(current_cycle,1));
		}
		else
		{
			let next_creation=self.pending_messages.iter().filter_map(|queue|queue.front().map(|m|m.creation_cycle)).min();
			if let Some(cycle)=next_creation
			{
				events.extend(self.schedule_process(current_cycle,cycle-current_cycle));
			}
		}
		events
	}
	///Send at most one flit over the link, round-robin across the channels with credit.
	fn feed_output_link(&mut self, current_cycle:Time) -> Vec<EventGeneration>
	{
		let num_vcs=self.params.num_vcs();
		for delta in 0..num_vcs
		{
			let vc=(self.vc_round_robin+delta)%num_vcs;
			if self.out_vcs[vc].is_ready(current_cycle+1) && self.out_vc_states[vc].credits>0
			{
				let mut flit=self.out_vcs[vc].get_top_flit().expect("the channel was just seen ready");
				self.out_vc_states[vc].credits-=1;
				flit.vc=Some(vc);
				flit.advance_stage(Stage::LinkTraversal,current_cycle+1);
				self.vc_round_robin=(vc+1)%num_vcs;
				let was_empty=self.out_buffer.is_empty();
				self.out_buffer.insert(flit);
				if was_empty
				{
					return vec![EventGeneration{
						delay: 1,
						position: CyclePosition::Begin,
						event: Event::LinkTransfer{link:self.out_link},
					}];
				}
				return vec![];
			}
		}
		vec![]
	}
	///A credit from the router's input unit: one more buffer slot, and with the free signal the whole lane back to idle.
	pub fn process_credit(&mut self, current_cycle:Time, credit:Credit) -> Vec<EventGeneration>
	{
		self.out_vc_states[credit.vc].credits+=1;
		if credit.is_free_signal
		{
			self.out_vc_states[credit.vc].state=VcState::Idle;
			self.out_vc_states[credit.vc].state_time=current_cycle;
		}
		//A pending message may take a freed channel, or a stalled flit its returned credit, this very cycle.
		self.schedule_process(current_cycle,0).into_iter().collect()
	}
	///A flit arrives from the router: consume it, return a credit, and deliver the message when the tail closes the packet.
	pub fn receive_flit(&mut self, current_cycle:Time, flit:Flit, statistics:&mut Statistics) -> Vec<EventGeneration>
	{
		assert!( flit.route.dest_nodes.contains(&self.id), "a flit reached an interface it was not headed to" );
		let mut events=vec![];
		statistics.track_received_flit(&flit);
		let vc=flit.vc.expect("a flit arrived to an interface without a virtual channel");
		let was_empty=self.credit_queue.is_empty();
		self.credit_queue.insert(Credit{vc,is_free_signal:flit.flit_type.is_tail()},current_cycle+1);
		if was_empty
		{
			events.push(EventGeneration{
				delay: 1,
				position: CyclePosition::Begin,
				event: Event::CreditLinkTransfer{link:self.credit_link},
			});
		}
		if flit.flit_type.is_tail()
		{
			let seen=self.reassembly.remove(&flit.packet_id).unwrap_or(0);
			assert_eq!( seen+1, flit.packet_size, "a packet was closed with flits missing" );
			statistics.track_received_packet(current_cycle,&flit,&self.params);
			self.received_messages.push_back(flit.message.clone());
		}
		else
		{
			*self.reassembly.entry(flit.packet_id).or_insert(0)+=1;
		}
		events
	}
}

impl Quantifiable for NetworkInterface
{
	fn total_memory(&self) -> usize
	{
		let mut total=size_of::<NetworkInterface>()+self.out_buffer.total_memory()+self.credit_queue.total_memory();
		for buffer in self.out_vcs.iter()
		{
			total+=buffer.total_memory();
		}
		total+=self.out_vc_states.capacity()*size_of::<OutVcState>();
		for queue in self.pending_messages.iter()
		{
			total+=(queue.capacity()+1)*size_of::<Rc<Message>>();
		}
		total+=(self.received_messages.capacity()+1)*size_of::<Rc<Message>>();
		total+=self.reassembly.len()*size_of::<(u64,usize)>();
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
