/*!

Topology construction and the registries of routers, interfaces and links.

The network builds a k-ary n-cube by default, or the reference mesh when `num_rows`/`num_cols` are given. Every node carries one interface hanging from the router of the same index, through an external link pair; every router pair adjacent along an axis is joined by a directed link and its opposite credit link. The per-vnet routing tables are filled with dimension-order reachability at build time.

*/

use std::mem::size_of;
use std::rc::Rc;

use crate::config::ConfigurationValue;
use crate::match_object_panic;
use crate::event::{Time,Event,EventGeneration,CyclePosition};
use crate::interface::NetworkInterface;
use crate::link::{CreditLink,LinkEndpoint,LinkType,NetworkLink};
use crate::quantify::Quantifiable;
use crate::router::Router;
use crate::topology::{AxisSign,CartesianData,PortDirection,ring_delta};

///The routing algorithm employed by every router of the network.
#[derive(Clone,Copy,PartialEq,Eq,Debug)]
pub enum RoutingAlgorithm
{
	///Consult the routing table built with the topology.
	Table,
	///Reference dimension-order routing for meshes.
	Xy,
	///Dimension-order routing for the torus with the two-class dateline partition.
	Deterministic,
	///Adaptive with dimension-reversal counters and bounded misrouting.
	StaticAdaptive,
	///Adaptive permitting hold-and-wait on busy channels under the youngest-wins rule.
	DynamicAdaptive,
}

impl RoutingAlgorithm
{
	pub fn from_name(name:&str) -> RoutingAlgorithm
	{
		match name
		{
			"TABLE" => RoutingAlgorithm::Table,
			"XY" => RoutingAlgorithm::Xy,
			"DETERMINISTIC" => RoutingAlgorithm::Deterministic,
			"STATIC_ADAPTIVE" => RoutingAlgorithm::StaticAdaptive,
			"DYNAMIC_ADAPTIVE" => RoutingAlgorithm::DynamicAdaptive,
			_ => panic!("Unknown routing algorithm {}",name),
		}
	}
}

///How the adaptive algorithms choose among their candidates.
#[derive(Clone,Copy,PartialEq,Eq,Debug)]
pub enum PickAlgorithm
{
	MinimumCongestion,
	StraightLines,
	Random,
}

impl PickAlgorithm
{
	pub fn from_name(name:&str) -> PickAlgorithm
	{
		match name
		{
			"MINIMUM_CONGESTION" => PickAlgorithm::MinimumCongestion,
			"STRAIGHT_LINES" => PickAlgorithm::StraightLines,
			"RANDOM" => PickAlgorithm::Random,
			_ => panic!("Unknown pick algorithm {}",name),
		}
	}
}

///The message class a virtual network carries, deciding its buffer depth and its traffic-distribution matrix.
#[derive(Clone,Copy,PartialEq,Eq,Debug)]
pub enum VnetType
{
	Ctrl,
	Data,
}

impl VnetType
{
	pub fn from_name(name:&str) -> VnetType
	{
		match name
		{
			"ctrl" => VnetType::Ctrl,
			"data" => VnetType::Data,
			_ => panic!("Unknown vnet type {}",name),
		}
	}
}

///Everything the components need to know about the network they live in.
pub struct NetworkParameters
{
	///Routers per dimension of the torus.
	pub num_ary: usize,
	///Dimensions of the torus.
	pub num_dim: usize,
	///Mesh override; when given the network is a `num_rows x num_cols` mesh instead of a torus.
	pub num_rows: Option<usize>,
	pub num_cols: Option<usize>,
	pub cartesian: CartesianData,
	pub num_routers: usize,
	pub virtual_networks: usize,
	pub vc_per_vnet: usize,
	///Lanes per vnet dedicated to the adaptive classes; the rest are the deterministic escape.
	pub vcs_adaptive: usize,
	///Flit size in bits.
	pub ni_flit_size: usize,
	pub buffers_per_data_vc: usize,
	pub buffers_per_ctrl_vc: usize,
	pub vnet_types: Vec<VnetType>,
	pub ordered_vnets: Vec<bool>,
	pub routing_algorithm: RoutingAlgorithm,
	pub pick_algorithm: PickAlgorithm,
	///Dimension reversals a packet may perform before being forced into the escape channels.
	pub dr_lim: u32,
	///Hops off the minimal paths a packet may take.
	pub misrouting_lim: u32,
	pub throttling_degree: u32,
	pub enable_fault_model: bool,
	pub link_latency: Time,
	pub ext_link_latency: Time,
	///Extra pass-through latency of the optional bridges at the link endpoints.
	pub bridge_delay: Time,
}

impl NetworkParameters
{
	pub fn new(cv:&ConfigurationValue) -> NetworkParameters
	{
		let mut num_ary=None;
		let mut num_dim=None;
		let mut num_rows=None;
		let mut num_cols=None;
		let mut virtual_networks=1;
		let mut vc_per_vnet=4;
		let mut vcs_adaptive=None;
		let mut ni_flit_size=128;
		let mut buffers_per_data_vc=4;
		let mut buffers_per_ctrl_vc=1;
		let mut vnet_types=None;
		let mut ordered_vnets=None;
		let mut routing_algorithm=RoutingAlgorithm::Table;
		let mut pick_algorithm=PickAlgorithm::MinimumCongestion;
		let mut dr_lim=1u32;
		let mut misrouting_lim=0u32;
		let mut throttling_degree=0u32;
		let mut enable_fault_model=false;
		let mut link_latency=1;
		let mut ext_link_latency=1;
		let mut bridge_delay=0;
		match_object_panic!(cv,["Configuration","NetworkParameters"],value,
			"num_ary" => num_ary=Some(value.as_usize().expect("bad value for num_ary")),
			"num_dim" => num_dim=Some(value.as_usize().expect("bad value for num_dim")),
			"num_rows" => num_rows=Some(value.as_usize().expect("bad value for num_rows")),
			"num_cols" => num_cols=Some(value.as_usize().expect("bad value for num_cols")),
			"virtual_networks" => virtual_networks=value.as_usize().expect("bad value for virtual_networks"),
			"vc_per_vnet" => vc_per_vnet=value.as_usize().expect("bad value for vc_per_vnet"),
			"vcs_adaptive" => vcs_adaptive=Some(value.as_usize().expect("bad value for vcs_adaptive")),
			"ni_flit_size" => ni_flit_size=value.as_usize().expect("bad value for ni_flit_size"),
			"buffers_per_data_vc" => buffers_per_data_vc=value.as_usize().expect("bad value for buffers_per_data_vc"),
			"buffers_per_ctrl_vc" => buffers_per_ctrl_vc=value.as_usize().expect("bad value for buffers_per_ctrl_vc"),
			"vnet_types" => vnet_types=Some(value.as_array().expect("bad value for vnet_types").iter()
				.map(|v|VnetType::from_name(v.as_str().expect("bad value in vnet_types"))).collect::<Vec<_>>()),
			"ordered_vnets" => ordered_vnets=Some(value.as_array().expect("bad value for ordered_vnets").iter()
				.map(|v|v.as_bool().expect("bad value in ordered_vnets")).collect::<Vec<_>>()),
			"routing_algorithm" => routing_algorithm=RoutingAlgorithm::from_name(value.as_str().expect("bad value for routing_algorithm")),
			"pick_algorithm" => pick_algorithm=PickAlgorithm::from_name(value.as_str().expect("bad value for pick_algorithm")),
			"dr_lim" => dr_lim=value.as_usize().expect("bad value for dr_lim") as u32,
			"misrouting_lim" => misrouting_lim=value.as_usize().expect("bad value for misrouting_lim") as u32,
			"throttling_degree" => throttling_degree=value.as_usize().expect("bad value for throttling_degree") as u32,
			"enable_fault_model" => enable_fault_model=value.as_bool().expect("bad value for enable_fault_model"),
			"link_latency" => link_latency=value.as_time().expect("bad value for link_latency"),
			"ext_link_latency" => ext_link_latency=value.as_time().expect("bad value for ext_link_latency"),
			"bridge_delay" => bridge_delay=value.as_time().expect("bad value for bridge_delay"),
			//Simulation-level fields, parsed by `Simulation::new`.
			"random_seed" => (),
			"cycles" => (),
			"injections" => (),
		);
		let mesh=num_rows.is_some() || num_cols.is_some();
		let (cartesian,num_routers)=if mesh
		{
			let rows=num_rows.expect("a mesh needs both num_rows and num_cols");
			let cols=num_cols.expect("a mesh needs both num_rows and num_cols");
			assert!( rows>0 && cols>0, "empty mesh" );
			if let (Some(k),Some(n))=(num_ary,num_dim)
			{
				let cube_size:usize=(0..n).map(|_|k).product();
				assert_eq!( rows*cols, cube_size, "mesh dimensions inconsistent with the router count" );
			}
			(CartesianData::new(&[cols,rows]),rows*cols)
		}
		else
		{
			let k=num_ary.expect("There were no num_ary");
			let n=num_dim.expect("There were no num_dim");
			assert!( k>=2, "a torus needs at least 2 routers per dimension" );
			assert!( n>=1, "a torus needs at least one dimension" );
			let cartesian=CartesianData::new_cube(k,n);
			let size=cartesian.size;
			(cartesian,size)
		};
		let parameters=NetworkParameters{
			num_ary: num_ary.unwrap_or(0),
			num_dim: num_dim.unwrap_or(0),
			num_rows,
			num_cols,
			cartesian,
			num_routers,
			virtual_networks,
			vc_per_vnet,
			vcs_adaptive: vcs_adaptive.unwrap_or_else(||vc_per_vnet.saturating_sub(2)),
			ni_flit_size,
			buffers_per_data_vc,
			buffers_per_ctrl_vc,
			vnet_types: vnet_types.unwrap_or_else(||vec![VnetType::Data;virtual_networks]),
			ordered_vnets: ordered_vnets.unwrap_or_else(||vec![false;virtual_networks]),
			routing_algorithm,
			pick_algorithm,
			dr_lim,
			misrouting_lim,
			throttling_degree,
			enable_fault_model,
			link_latency,
			ext_link_latency,
			bridge_delay,
		};
		parameters.check();
		parameters
	}
	///The configuration checks. All of them are fatal: a malformed configuration cannot produce correct cycle accounts.
	fn check(&self)
	{
		assert!( self.virtual_networks>=1, "at least one virtual network is required" );
		assert!( self.vc_per_vnet>=1, "at least one virtual channel per vnet is required" );
		assert_eq!( self.vnet_types.len(), self.virtual_networks, "one vnet type per virtual network" );
		assert_eq!( self.ordered_vnets.len(), self.virtual_networks, "one ordering flag per virtual network" );
		let mesh=self.num_rows.is_some();
		match self.routing_algorithm
		{
			RoutingAlgorithm::Table => (),
			RoutingAlgorithm::Xy => assert!( mesh, "XY routing requires a mesh" ),
			RoutingAlgorithm::Deterministic =>
			{
				assert!( !mesh, "deterministic torus routing does not apply to a mesh" );
				assert!( self.vc_per_vnet>=2, "deterministic routing requires at least 2 virtual channels per vnet" );
			},
			RoutingAlgorithm::StaticAdaptive | RoutingAlgorithm::DynamicAdaptive =>
			{
				assert!( !mesh, "adaptive torus routing does not apply to a mesh" );
				let levels=self.adaptive_levels();
				assert!( self.vc_per_vnet>=2+levels, "adaptive routing requires at least {} virtual channels per vnet",2+levels );
				assert!( levels==0 || self.vcs_adaptive>=levels, "at least one adaptive lane per level is required" );
				assert!( self.vc_per_vnet-self.vcs_adaptive>=2, "at least 2 escape lanes are required" );
			},
		}
	}
	pub fn num_vcs(&self) -> usize
	{
		self.virtual_networks*self.vc_per_vnet
	}
	pub fn buffers_per_vc(&self, vnet:usize) -> usize
	{
		match self.vnet_types[vnet]
		{
			VnetType::Data => self.buffers_per_data_vc,
			VnetType::Ctrl => self.buffers_per_ctrl_vc,
		}
	}
	pub fn is_vnet_ordered(&self, vnet:usize) -> bool
	{
		self.ordered_vnets[vnet]
	}
	///Adaptive levels of the channel classes; the level right above them is the deterministic escape.
	pub fn adaptive_levels(&self) -> usize
	{
		match self.routing_algorithm
		{
			RoutingAlgorithm::DynamicAdaptive => 2,
			_ => self.dr_lim as usize,
		}
	}
	///The absolute virtual channel range a `(vnet, class)` pair may allocate from.
	///Adaptive levels split the adaptive region; the escape region is halved by the dateline class.
	pub fn vc_span(&self, vnet:usize, outvc_class:usize) -> std::ops::Range<usize>
	{
		let v=self.vc_per_vnet;
		let base=vnet*v;
		let (low,high)=match self.routing_algorithm
		{
			RoutingAlgorithm::Table | RoutingAlgorithm::Xy => (0,v),
			RoutingAlgorithm::Deterministic =>
			{
				if outvc_class==0 { (0,v/2) } else { (v/2,v) }
			},
			RoutingAlgorithm::StaticAdaptive | RoutingAlgorithm::DynamicAdaptive =>
			{
				let levels=self.adaptive_levels();
				let level=outvc_class/3;
				let alpha=outvc_class%3;
				if level<levels
				{
					let share=self.vcs_adaptive/levels;
					let remainder=self.vcs_adaptive%levels;
					let start=level*share+level.min(remainder);
					let length=share+if level<remainder {1} else {0};
					(start,start+length)
				}
				else
				{
					let escape=v-self.vcs_adaptive;
					let half=escape/2;
					match alpha
					{
						0 => (self.vcs_adaptive,self.vcs_adaptive+half),
						1 => (self.vcs_adaptive+half,v),
						_ => (self.vcs_adaptive,v),
					}
				}
			},
		};
		base+low..base+high
	}
	///The first hop of the dimension-order route between two routers, used to fill the routing tables.
	pub fn first_hop_direction(&self, from:usize, dest:usize) -> PortDirection
	{
		assert!( from!=dest );
		if let Some(cols)=self.num_cols
		{
			let my_x=from%cols;
			let my_y=from/cols;
			let dest_x=dest%cols;
			let dest_y=dest/cols;
			if dest_x!=my_x
			{
				if dest_x>my_x { PortDirection::East } else { PortDirection::West }
			}
			else
			{
				if dest_y>my_y { PortDirection::North } else { PortDirection::South }
			}
		}
		else
		{
			let dim=(0..self.num_dim).find(|&i|self.cartesian.digit(from,i)!=self.cartesian.digit(dest,i))
				.expect("the routers differ in no dimension");
			let sign=if ring_delta(self.cartesian.digit(from,dim),self.cartesian.digit(dest,dim),self.num_ary)>0 { AxisSign::Upper } else { AxisSign::Lower };
			PortDirection::Axis{dimension:dim,sign}
		}
	}
}

///The instantiated network: routers, interfaces and the links joining them.
pub struct Network
{
	pub params: Rc<NetworkParameters>,
	pub routers: Vec<Router>,
	pub interfaces: Vec<NetworkInterface>,
	pub links: Vec<NetworkLink>,
	pub credit_links: Vec<CreditLink>,
	pub next_packet_id: u64,
}

impl Network
{
	pub fn new(params:Rc<NetworkParameters>) -> Network
	{
		let n=params.num_routers;
		let mut network=Network{
			routers: (0..n).map(|index|Router::new(index,params.clone())).collect(),
			interfaces: (0..n).map(|index|NetworkInterface::new(index,index,params.clone())).collect(),
			links: vec![],
			credit_links: vec![],
			next_packet_id: 0,
			params,
		};
		network.make_external_links();
		network.make_internal_links();
		network.fill_routing_tables();
		for router in network.routers.iter_mut()
		{
			router.initialize();
		}
		network
	}
	fn add_link(&mut self, link_type:LinkType, latency:Time, source:LinkEndpoint, destination:LinkEndpoint) -> usize
	{
		let id=self.links.len();
		let num_vcs=self.params.num_vcs();
		self.links.push(NetworkLink::new(id,link_type,latency,source,destination,num_vcs));
		id
	}
	fn add_credit_link(&mut self, latency:Time, source:LinkEndpoint, destination:LinkEndpoint) -> usize
	{
		let id=self.credit_links.len();
		self.credit_links.push(CreditLink::new(id,latency,source,destination));
		id
	}
	///One interface per router, joined by the external link pair plus the opposite credit links.
	fn make_external_links(&mut self)
	{
		let latency=self.params.ext_link_latency+self.params.bridge_delay;
		for r in 0..self.params.num_routers
		{
			//Interface into router.
			let inport=self.routers[r].num_inports();
			let in_link=self.add_link(LinkType::ExtIn,latency,LinkEndpoint::Interface{interface:r},LinkEndpoint::RouterPort{router:r,port:inport});
			let in_credit=self.add_credit_link(latency,LinkEndpoint::RouterPort{router:r,port:inport},LinkEndpoint::Interface{interface:r});
			self.routers[r].add_in_port(PortDirection::Local,in_credit);
			self.interfaces[r].out_link=in_link;
			//Router into interface.
			let outport=self.routers[r].num_outports();
			let out_link=self.add_link(LinkType::ExtOut,latency,LinkEndpoint::RouterPort{router:r,port:outport},LinkEndpoint::Interface{interface:r});
			let out_credit=self.add_credit_link(latency,LinkEndpoint::Interface{interface:r},LinkEndpoint::RouterPort{router:r,port:outport});
			self.routers[r].add_out_port(PortDirection::Local,out_link,out_credit);
			self.interfaces[r].credit_link=out_credit;
		}
	}
	///The directed router-to-router links, each with its opposite credit link.
	fn make_internal_links(&mut self)
	{
		let latency=self.params.link_latency+self.params.bridge_delay;
		let params=self.params.clone();
		if params.num_cols.is_some()
		{
			for r in 0..params.num_routers
			{
				for direction in [PortDirection::East,PortDirection::North,PortDirection::West,PortDirection::South]
				{
					if let Some(neighbour)=self.mesh_neighbour(r,direction)
					{
						self.join(r,direction,neighbour,latency);
					}
				}
			}
		}
		else
		{
			for r in 0..params.num_routers
			{
				for dimension in 0..params.num_dim
				{
					for sign in [AxisSign::Lower,AxisSign::Upper]
					{
						let neighbour=params.cartesian.cube_neighbour(r,dimension,sign);
						self.join(r,PortDirection::Axis{dimension,sign},neighbour,latency);
					}
				}
			}
		}
	}
	fn mesh_neighbour(&self, router:usize, direction:PortDirection) -> Option<usize>
	{
		let cols=self.params.num_cols.expect("not a mesh");
		let rows=self.params.num_rows.expect("not a mesh");
		let x=router%cols;
		let y=router/cols;
		match direction
		{
			PortDirection::East if x+1<cols => Some(router+1),
			PortDirection::West if x>0 => Some(router-1),
			PortDirection::North if y+1<rows => Some(router+cols),
			PortDirection::South if y>0 => Some(router-cols),
			_ => None,
		}
	}
	///Create a directed link from `source` through its port `direction` into `destination`, with the credit link coming back.
	fn join(&mut self, source:usize, direction:PortDirection, destination:usize, latency:Time)
	{
		let outport=self.routers[source].num_outports();
		let inport=self.routers[destination].num_inports();
		let link=self.add_link(LinkType::Internal,latency,LinkEndpoint::RouterPort{router:source,port:outport},LinkEndpoint::RouterPort{router:destination,port:inport});
		let credit=self.add_credit_link(latency,LinkEndpoint::RouterPort{router:destination,port:inport},LinkEndpoint::RouterPort{router:source,port:outport});
		self.routers[source].add_out_port(direction,link,credit);
		self.routers[destination].add_in_port(direction.reverse(),credit);
	}
	///Fill the per-vnet reachability sets: the local port covers the router's own node, each internal port the destinations whose dimension-order route leaves through it.
	fn fill_routing_tables(&mut self)
	{
		let params=self.params.clone();
		for r in 0..params.num_routers
		{
			for outport in 0..self.routers[r].num_outports()
			{
				let direction=self.routers[r].output_units[outport].direction;
				let dests:Vec<usize>=match direction
				{
					PortDirection::Local => vec![r],
					_ => (0..params.num_routers).filter(|&dest|dest!=r && params.first_hop_direction(r,dest)==direction).collect(),
				};
				let entry=(0..params.virtual_networks).map(|_|dests.clone()).collect();
				self.routers[r].routing_unit.add_route(entry);
				self.routers[r].routing_unit.add_weight(1);
			}
		}
	}
	///A network link takes one ready flit out of its source buffer and delivers it after its latency.
	pub fn link_transfer(&mut self, link:usize, current_cycle:Time) -> Vec<EventGeneration>
	{
		let (source,destination,latency,link_type)={
			let link=&self.links[link];
			(link.source,link.destination,link.latency,link.link_type)
		};
		let mut events=vec![];
		let taken=match source
		{
			LinkEndpoint::RouterPort{router,port} =>
			{
				let buffer=&mut self.routers[router].output_units[port].out_buffer;
				if buffer.is_ready(current_cycle) { buffer.get_top_flit() } else { None }
			},
			LinkEndpoint::Interface{interface} =>
			{
				let buffer=&mut self.interfaces[interface].out_buffer;
				if buffer.is_ready(current_cycle) { buffer.get_top_flit() } else { None }
			},
		};
		if let Some(mut flit)=taken
		{
			let vc=flit.vc.expect("a flit traversed a link without a virtual channel");
			self.links[link].track_traversal(vc);
			if link_type==LinkType::Internal
			{
				flit.route.hops+=1;
			}
			let event=match destination
			{
				LinkEndpoint::RouterPort{router,port} => Event::FlitToRouter{flit,router,port},
				LinkEndpoint::Interface{interface} => Event::FlitToInterface{flit,interface},
			};
			events.push(EventGeneration{
				delay: latency-1,
				position: CyclePosition::Begin,
				event,
			});
		}
		let remaining=match source
		{
			LinkEndpoint::RouterPort{router,port} => !self.routers[router].output_units[port].out_buffer.is_empty(),
			LinkEndpoint::Interface{interface} => !self.interfaces[interface].out_buffer.is_empty(),
		};
		if remaining
		{
			events.push(EventGeneration{
				delay: 1,
				position: CyclePosition::Begin,
				event: Event::LinkTransfer{link},
			});
		}
		events
	}
	///A credit link takes one ready credit out of its source queue; one per cycle, rescheduling itself while any remain.
	pub fn credit_link_transfer(&mut self, link:usize, current_cycle:Time) -> Vec<EventGeneration>
	{
		let (source,destination,latency)={
			let link=&self.credit_links[link];
			(link.source,link.destination,link.latency)
		};
		let mut events=vec![];
		let taken=match source
		{
			LinkEndpoint::RouterPort{router,port} => self.routers[router].input_units[port].credit_queue.pop_ready(current_cycle),
			LinkEndpoint::Interface{interface} => self.interfaces[interface].credit_queue.pop_ready(current_cycle),
		};
		if let Some(credit)=taken
		{
			let event=match destination
			{
				LinkEndpoint::RouterPort{router,port} => Event::CreditToRouter{credit,router,port},
				LinkEndpoint::Interface{interface} => Event::CreditToInterface{credit,interface},
			};
			events.push(EventGeneration{
				delay: latency-1,
				position: CyclePosition::Begin,
				event,
			});
		}
		let remaining=match source
		{
			LinkEndpoint::RouterPort{router,port} => !self.routers[router].input_units[port].credit_queue.is_empty(),
			LinkEndpoint::Interface{interface} => !self.interfaces[interface].credit_queue.is_empty(),
		};
		if remaining
		{
			events.push(EventGeneration{
				delay: 1,
				position: CyclePosition::Begin,
				event: Event::CreditLinkTransfer{link},
			});
		}
		events
	}
	///The per-cycle work of an interface, with the packet id counter threaded through.
	pub fn process_interface(&mut self, interface:usize, current_cycle:Time, statistics:&mut crate::measures::Statistics) -> Vec<EventGeneration>
	{
		let next_packet_id=&mut self.next_packet_id;
		self.interfaces[interface].process(current_cycle,next_packet_id,statistics)
	}
}

impl Quantifiable for Network
{
	fn total_memory(&self) -> usize
	{
		let mut total=size_of::<Network>();
		for router in self.routers.iter()
		{
			total+=router.total_memory();
		}
		for interface in self.interfaces.iter()
		{
			total+=interface.total_memory();
		}
		for link in self.links.iter()
		{
			total+=link.total_memory();
		}
		for link in self.credit_links.iter()
		{
			total+=link.total_memory();
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
	fn torus_parameters(routing_algorithm:&str) -> Rc<NetworkParameters>
	{
		let cv=ConfigurationValue::Object("NetworkParameters".to_string(),vec![
			("num_ary".to_string(),ConfigurationValue::Number(3.0)),
			("num_dim".to_string(),ConfigurationValue::Number(2.0)),
			("vc_per_vnet".to_string(),ConfigurationValue::Number(4.0)),
			("routing_algorithm".to_string(),ConfigurationValue::Literal(routing_algorithm.to_string())),
			("dr_lim".to_string(),ConfigurationValue::Number(2.0)),
		]);
		Rc::new(NetworkParameters::new(&cv))
	}
	#[test]
	fn build_torus()
	{
		let params=torus_parameters("DETERMINISTIC");
		let network=Network::new(params.clone());
		assert_eq!( network.routers.len(), 9 );
		assert_eq!( network.interfaces.len(), 9 );
		//Per router: one external pair plus 2 links per dimension.
		assert_eq!( network.links.len(), 9*(2+4) );
		assert_eq!( network.credit_links.len(), network.links.len() );
		for router in network.routers.iter()
		{
			assert_eq!( router.num_inports(), 5 );
			assert_eq!( router.num_outports(), 5 );
			assert_eq!( router.input_units[0].direction, PortDirection::Local );
			assert_eq!( router.output_units[0].direction, PortDirection::Local );
		}
		//The local entry covers only the router's own node.
		assert_eq!( network.routers[4].routing_unit.routing_table[0][0], vec![4] );
	}
	#[test]
	fn table_reachability_is_total()
	{
		let params=torus_parameters("DETERMINISTIC");
		let network=Network::new(params.clone());
		for r in 0..9
		{
			let table=&network.routers[r].routing_unit.routing_table[0];
			for dest in 0..9
			{
				let count=table.iter().filter(|dests|dests.contains(&dest)).count();
				assert_eq!( count, 1, "destination {} should be reachable through exactly one port of router {}",dest,r );
			}
		}
	}
	#[test]
	fn first_hops()
	{
		let params=torus_parameters("DETERMINISTIC");
		//0 to 1 goes up dimension 0; 0 to 2 wraps down; 0 to 4 starts in dimension 0.
		assert_eq!( params.first_hop_direction(0,1), PortDirection::upper(0) );
		assert_eq!( params.first_hop_direction(0,2), PortDirection::lower(0) );
		assert_eq!( params.first_hop_direction(0,4), PortDirection::upper(0) );
		assert_eq!( params.first_hop_direction(0,3), PortDirection::upper(1) );
		assert_eq!( params.first_hop_direction(0,6), PortDirection::lower(1) );
	}
	#[test]
	fn adaptive_spans()
	{
		let params=torus_parameters("STATIC_ADAPTIVE");
		//4 lanes, dr_lim 2: lanes 0 and 1 are the adaptive levels, 2 and 3 the escape halves.
		assert_eq!( params.vcs_adaptive, 2 );
		assert_eq!( params.adaptive_levels(), 2 );
		assert_eq!( params.vc_span(0,0), 0..1 );
		assert_eq!( params.vc_span(0,1), 0..1 );
		assert_eq!( params.vc_span(0,2), 0..1 );
		assert_eq!( params.vc_span(0,3), 1..2 );
		assert_eq!( params.vc_span(0,3*2+0), 2..3 );
		assert_eq!( params.vc_span(0,3*2+1), 3..4 );
	}
	#[test]
	#[should_panic]
	fn insufficient_channels()
	{
		let cv=ConfigurationValue::Object("NetworkParameters".to_string(),vec![
			("num_ary".to_string(),ConfigurationValue::Number(3.0)),
			("num_dim".to_string(),ConfigurationValue::Number(2.0)),
			("vc_per_vnet".to_string(),ConfigurationValue::Number(3.0)),
			("routing_algorithm".to_string(),ConfigurationValue::Literal("STATIC_ADAPTIVE".to_string())),
			("dr_lim".to_string(),ConfigurationValue::Number(2.0)),
		]);
		NetworkParameters::new(&cv);
	}
	#[test]
	#[should_panic]
	fn inconsistent_mesh()
	{
		let cv=ConfigurationValue::Object("NetworkParameters".to_string(),vec![
			("num_ary".to_string(),ConfigurationValue::Number(3.0)),
			("num_dim".to_string(),ConfigurationValue::Number(2.0)),
			("num_rows".to_string(),ConfigurationValue::Number(2.0)),
			("num_cols".to_string(),ConfigurationValue::Number(2.0)),
		]);
		NetworkParameters::new(&cv);
	}
}
