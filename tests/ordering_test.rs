mod common;

use common::*;
use tornoc::{Message,Simulation};
use tornoc::config::ConfigurationValue;
use tornoc::flit::{Flit,FlitType,RouteInfo,Stage};
use std::rc::Rc;

fn ordered_configuration(cycles:f64) -> ConfigurationValue
{
	torus_configuration(3.0,2.0,"DETERMINISTIC",cycles,vec![
		extra("ordered_vnets",ConfigurationValue::Array(vec![ConfigurationValue::True])),
	],vec![])
}

fn marked_message(origin:usize, destination:usize, mark:u8, creation_cycle:u64) -> Message
{
	Message{
		origin,
		destinations: vec![destination],
		vnet: 0,
		size: 128,
		creation_cycle,
		payload: vec![mark],
	}
}

fn sa_head(src_router:usize, dest_router:usize, vc:usize, stage_time:u64) -> Flit
{
	Flit{
		packet_id: vc as u64,
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
			dr: 0,
			misrouting: 0,
			hops: 0,
		},
		outport: None,
		vc: Some(vc),
		stage: Stage::SwitchAllocation,
		stage_time,
		enqueue_time: stage_time,
		queueing_delay: 0,
		message: Rc::new(Message{ origin:src_router, destinations:vec![dest_router], vnet:0, size:128, creation_cycle:0, payload:vec![] }),
	}
}

///Two packets injected back to back on an ordered vnet arrive in injection order.
#[test]
fn ordered_vnet_preserves_order()
{
	let cv=ordered_configuration(40.0);
	let mut simulation=Simulation::new(&cv);
	simulation.inject_message(marked_message(0,1,1,0));
	simulation.inject_message(marked_message(0,1,2,0));
	simulation.run();
	let marks:Vec<u8>=simulation.received_messages(1).map(|m|m.payload[0]).collect();
	assert_eq!( marks, vec![1,2] );
	assert_network_drained(&simulation);
}

///On an ordered vnet, a later head contending for the same outport is held back while an earlier one awaits allocation.
#[test]
fn later_head_cannot_pass_earlier_one()
{
	let cv=ordered_configuration(10.0);
	let mut simulation=Simulation::new(&cv);
	let router=&mut simulation.network.routers[0];
	let inport=0;
	let outport=1;
	//Two heads on different lanes of the same inport, both wanting the same outport, the first one older.
	router.input_units[inport].begin_packet(0,5);
	router.input_units[inport].vcs[0].outport=Some(outport);
	router.input_units[inport].vcs[0].outvc_class=Some(0);
	router.input_units[inport].vcs[0].buffer.insert(sa_head(0,1,0,5));
	router.input_units[inport].begin_packet(1,6);
	router.input_units[inport].vcs[1].outport=Some(outport);
	router.input_units[inport].vcs[1].outvc_class=Some(0);
	router.input_units[inport].vcs[1].buffer.insert(sa_head(0,1,1,6));
	assert!( router.send_allowed(7,inport,0,outport,None), "the earlier head should be allowed" );
	assert!( !router.send_allowed(7,inport,1,outport,None), "the later head should wait for the earlier one" );
	//A head for a different outport is not restrained.
	router.input_units[inport].vcs[1].outport=Some(2);
	assert!( router.send_allowed(7,inport,1,2,None) );
}

///Without ordering both lanes may request independently.
#[test]
fn unordered_vnet_does_not_restrain()
{
	let cv=torus_configuration(3.0,2.0,"DETERMINISTIC",10.0,vec![],vec![]);
	let mut simulation=Simulation::new(&cv);
	let router=&mut simulation.network.routers[0];
	let inport=0;
	let outport=1;
	router.input_units[inport].begin_packet(0,5);
	router.input_units[inport].vcs[0].outport=Some(outport);
	router.input_units[inport].vcs[0].outvc_class=Some(0);
	router.input_units[inport].vcs[0].buffer.insert(sa_head(0,1,0,5));
	router.input_units[inport].begin_packet(1,6);
	router.input_units[inport].vcs[1].outport=Some(outport);
	router.input_units[inport].vcs[1].outvc_class=Some(0);
	router.input_units[inport].vcs[1].buffer.insert(sa_head(0,1,1,6));
	assert!( router.send_allowed(7,inport,0,outport,None) );
	assert!( router.send_allowed(7,inport,1,outport,None) );
}

///An ordered flow through the whole network keeps order under load.
#[test]
fn ordered_stream_under_load()
{
	let cv=ordered_configuration(400.0);
	let mut simulation=Simulation::new(&cv);
	for mark in 0..20u8
	{
		simulation.inject_message(marked_message(0,8,mark,0));
	}
	simulation.run();
	let marks:Vec<u8>=simulation.received_messages(8).map(|m|m.payload[0]).collect();
	assert_eq!( marks, (0..20).collect::<Vec<u8>>() );
	assert_network_drained(&simulation);
}
