mod common;

use common::*;
use tornoc::Simulation;
use tornoc::config::ConfigurationValue;
use tornoc::flit::{Flit,FlitType,RouteInfo,Stage};
use tornoc::topology::PortDirection;
use ::rand::rngs::StdRng;
use rand::SeedableRng;
use std::rc::Rc;

fn head_flit(src_router:usize, dest_router:usize, dr:u32) -> Flit
{
	Flit{
		packet_id: 999,
		index: 0,
		flit_type: FlitType::HeadTail,
		vnet: 0,
		packet_size: 1,
		source: src_router,
		destination: dest_router,
		route: RouteInfo{
			src_router,
			dest_router,
			dest_nodes: vec![dest_router],
			vnet: 0,
			dr,
			misrouting: 0,
			hops: 0,
		},
		outport: None,
		vc: Some(0),
		stage: Stage::RouteCompute,
		stage_time: 0,
		enqueue_time: 0,
		queueing_delay: 0,
		message: Rc::new(tornoc::Message{ origin:src_router, destinations:vec![dest_router], vnet:0, size:128, creation_cycle:0, payload:vec![] }),
	}
}

fn adaptive_extra(dr_lim:f64, misrouting_lim:f64) -> Vec<(String,ConfigurationValue)>
{
	vec![
		extra("dr_lim",ConfigurationValue::Number(dr_lim)),
		extra("misrouting_lim",ConfigurationValue::Number(misrouting_lim)),
		extra("pick_algorithm",ConfigurationValue::Literal("MINIMUM_CONGESTION".to_string())),
	]
}

///Both dimensions differ; the adaptive route still reaches the opposite corner in two hops.
#[test]
fn static_adaptive_corner_route()
{
	let cv=torus_configuration(3.0,2.0,"STATIC_ADAPTIVE",40.0,adaptive_extra(2.0,0.0),vec![
		injection(0.0,8.0,128.0,0.0),
	]);
	let mut simulation=Simulation::new(&cv);
	simulation.run();
	let results=simulation.get_simulation_results();
	assert_eq!( result_array(&results,"packets_received"), vec![1.0] );
	//Both digits are one wrap hop away.
	assert_eq!( result_number(&results,"average_hops"), 2.0 );
	assert!( result_number(&results,"average_drs")<=2.0 );
	assert_eq!( result_number(&results,"average_misrouting"), 0.0 );
	assert_network_drained(&simulation);
}

///At the reversal limit the adaptive algorithm must produce exactly the deterministic decision, in the escape class.
#[test]
fn fallback_matches_deterministic()
{
	let cv=torus_configuration(3.0,2.0,"STATIC_ADAPTIVE",10.0,adaptive_extra(1.0,0.0),vec![]);
	let mut simulation=Simulation::new(&cv);
	let mut rng=StdRng::seed_from_u64(7);
	for dest in [1usize,2,3,4,6,8]
	{
		let flit=head_flit(0,dest,1);
		let router=&mut simulation.network.routers[0];
		let inport=0;//Local
		router.input_units[inport].begin_packet(0,0);
		let (outport,class)=router.route_flit(0,inport,0,&flit,&mut rng).expect("routing failed");
		let (det_outport,det_class)=router.route_deterministic(&flit.route,PortDirection::Local);
		assert_eq!( outport, det_outport, "escape for destination {} diverged from the deterministic route",dest );
		assert_eq!( class, 3*1+det_class );
		router.input_units[inport].set_vc_idle(0,0);
	}
}

///A fresh head on an uncongested router takes a minimal candidate and the channel is granted on the spot.
#[test]
fn adaptive_grants_free_channel_at_route_time()
{
	let cv=torus_configuration(3.0,2.0,"STATIC_ADAPTIVE",10.0,adaptive_extra(2.0,0.0),vec![]);
	let mut simulation=Simulation::new(&cv);
	let mut rng=StdRng::seed_from_u64(7);
	let flit=head_flit(0,8,0);
	let router=&mut simulation.network.routers[0];
	router.input_units[0].begin_packet(0,0);
	let (outport,class)=router.route_flit(0,0,0,&flit,&mut rng).expect("routing failed");
	//Level 0 of the adaptive region, entered from the local port.
	assert_eq!( class, 2 );
	let granted=router.input_units[0].get_outvc(0).expect("no channel granted");
	let span=simulation.network.params.vc_span(0,class);
	assert!( span.contains(&granted) );
	let output_unit=&simulation.network.routers[0].output_units[outport];
	assert!( !output_unit.is_vc_idle(granted) );
	//The grant sits at the head of the waiting queue as the channel holder.
	let holder=output_unit.waiting_queues[granted].peek().expect("no holder recorded");
	assert_eq!( (holder.inport,holder.invc), (0,0) );
}

///A freed channel reactivates the next waiter in line, granting it across the router.
#[test]
fn credit_reactivates_waiting_head()
{
	let cv=torus_configuration(3.0,2.0,"STATIC_ADAPTIVE",10.0,adaptive_extra(1.0,0.0),vec![]);
	let mut simulation=Simulation::new(&cv);
	let params=simulation.network.params.clone();
	let router=&mut simulation.network.routers[0];
	let outport=1;
	let span=params.vc_span(0,2);
	let vc=span.start;
	//A holder on the channel and a waiter behind it.
	router.input_units[2].begin_packet(0,0);
	router.output_units[outport].select_free_vc(vc..vc+1,0).expect("channel not free");
	router.output_units[outport].enqueue_waiting_queue(vc,2,0,0);
	router.input_units[2].grant_outvc(0,vc);
	router.input_units[3].begin_packet(1,1);
	router.output_units[outport].enqueue_waiting_queue(vc,3,1,0);
	assert_eq!( router.input_units[3].get_outvc(1), None );
	//The tail of the holder departs downstream: a free-signal credit comes back.
	router.process_credit(5,outport,tornoc::flit::Credit{vc,is_free_signal:true});
	//The waiter is now the holder and owns the channel.
	assert_eq!( router.input_units[3].get_outvc(1), Some(vc) );
	assert!( !router.output_units[outport].is_vc_idle(vc) );
	let holder=router.output_units[outport].waiting_queues[vc].peek().expect("queue empty after reactivation");
	assert_eq!( (holder.inport,holder.invc), (3,1) );
	//A second free signal drains the queue and leaves the channel idle.
	router.process_credit(9,outport,tornoc::flit::Credit{vc,is_free_signal:true});
	assert!( router.output_units[outport].is_vc_idle(vc) );
	assert!( router.output_units[outport].waiting_queues[vc].is_empty() );
}

///Heavy convergent traffic drains without losing packets or credits.
#[test]
fn static_adaptive_hotspot_drains()
{
	let mut injections=vec![];
	for source in 0..9
	{
		if source!=4
		{
			for copy in 0..3
			{
				injections.push(injection(source as f64,4.0,2.0*128.0,copy as f64));
			}
		}
	}
	let cv=torus_configuration(3.0,2.0,"STATIC_ADAPTIVE",300.0,adaptive_extra(2.0,1.0),injections);
	let mut simulation=Simulation::new(&cv);
	simulation.run();
	let results=simulation.get_simulation_results();
	assert_eq!( result_array(&results,"packets_injected"), vec![24.0] );
	assert_eq!( result_array(&results,"packets_received"), vec![24.0] );
	assert!( result_number(&results,"average_drs")<=2.0 );
	assert_network_drained(&simulation);
	assert_eq!( simulation.received_messages(4).count(), 24 );
}

///The dynamic variant with its three coarse levels also drains the hotspot.
#[test]
fn dynamic_adaptive_hotspot_drains()
{
	let mut injections=vec![];
	for source in 0..9
	{
		if source!=4
		{
			injections.push(injection(source as f64,4.0,2.0*128.0,0.0));
			injections.push(injection(source as f64,4.0,128.0,2.0));
		}
	}
	let cv=torus_configuration(3.0,2.0,"DYNAMIC_ADAPTIVE",300.0,adaptive_extra(2.0,1.0),injections);
	let mut simulation=Simulation::new(&cv);
	simulation.run();
	let results=simulation.get_simulation_results();
	assert_eq!( result_array(&results,"packets_injected"), vec![16.0] );
	assert_eq!( result_array(&results,"packets_received"), vec![16.0] );
	assert_network_drained(&simulation);
}

///Uniform all-to-all under the adaptive algorithm, with the other pick algorithms exercised.
#[test]
fn pick_algorithms_deliver()
{
	for pick in ["STRAIGHT_LINES","RANDOM"]
	{
		let mut injections=vec![];
		for source in 0..9
		{
			for destination in 0..9
			{
				injections.push(injection(source as f64,destination as f64,128.0,0.0));
			}
		}
		let mut extra_pairs=vec![
			extra("dr_lim",ConfigurationValue::Number(2.0)),
			extra("misrouting_lim",ConfigurationValue::Number(0.0)),
			extra("pick_algorithm",ConfigurationValue::Literal(pick.to_string())),
		];
		extra_pairs.push(extra("vcs_adaptive",ConfigurationValue::Number(2.0)));
		let cv=torus_configuration(3.0,2.0,"STATIC_ADAPTIVE",400.0,extra_pairs,injections);
		let mut simulation=Simulation::new(&cv);
		simulation.run();
		let results=simulation.get_simulation_results();
		assert_eq!( result_array(&results,"packets_received"), vec![81.0], "pick algorithm {} lost packets",pick );
		assert_network_drained(&simulation);
	}
}
