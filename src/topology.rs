/*!

Coordinates and port naming for the supported topologies.

A k-ary n-cube is an n-dimensional torus with k routers per dimension. A router id in `[0,k^n)` decodes to n radix-k digits, with the least significant digit being dimension 0. The reference mesh used by XY routing names its ports with the four cardinal directions instead.

*/

use std::fmt::{self,Display,Formatter};
use std::str::FromStr;
use std::mem::size_of;

use crate::quantify::Quantifiable;

///The way of a hop along an axis of the torus: towards the next lower or the next upper digit.
#[derive(Clone,Copy,PartialEq,Eq,PartialOrd,Ord,Debug)]
pub enum AxisSign
{
	Lower,
	Upper,
}

impl AxisSign
{
	pub fn reverse(self) -> AxisSign
	{
		match self
		{
			AxisSign::Lower => AxisSign::Upper,
			AxisSign::Upper => AxisSign::Lower,
		}
	}
}

///The direction a router port points to.
///External ports are `Local`; internal torus ports go along an axis; the reference mesh uses the cardinal directions.
///The `Display` names (`Local`, `lower<d>`, `upper<d>`, `North`, ...) are the ones used in topology files and logs.
#[derive(Clone,Copy,PartialEq,Eq,PartialOrd,Ord,Debug)]
pub enum PortDirection
{
	Local,
	Axis{
		dimension: usize,
		sign: AxisSign,
	},
	North,
	South,
	East,
	West,
}

impl PortDirection
{
	pub fn lower(dimension:usize) -> PortDirection
	{
		PortDirection::Axis{ dimension, sign:AxisSign::Lower }
	}
	pub fn upper(dimension:usize) -> PortDirection
	{
		PortDirection::Axis{ dimension, sign:AxisSign::Upper }
	}
	pub fn is_local(self) -> bool
	{
		self==PortDirection::Local
	}
	///The dimension of the axis the port goes along, if any.
	pub fn dimension(self) -> Option<usize>
	{
		match self
		{
			PortDirection::Axis{dimension,..} => Some(dimension),
			_ => None,
		}
	}
	///The direction of the port at the other endpoint of a torus or mesh link.
	pub fn reverse(self) -> PortDirection
	{
		match self
		{
			PortDirection::Local => PortDirection::Local,
			PortDirection::Axis{dimension,sign} => PortDirection::Axis{dimension,sign:sign.reverse()},
			PortDirection::North => PortDirection::South,
			PortDirection::South => PortDirection::North,
			PortDirection::East => PortDirection::West,
			PortDirection::West => PortDirection::East,
		}
	}
}

impl Display for PortDirection
{
	fn fmt(&self, formatter:&mut Formatter) -> Result<(),fmt::Error>
	{
		match self
		{
			PortDirection::Local => write!(formatter,"Local"),
			PortDirection::Axis{dimension,sign:AxisSign::Lower} => write!(formatter,"lower{}",dimension),
			PortDirection::Axis{dimension,sign:AxisSign::Upper} => write!(formatter,"upper{}",dimension),
			PortDirection::North => write!(formatter,"North"),
			PortDirection::South => write!(formatter,"South"),
			PortDirection::East => write!(formatter,"East"),
			PortDirection::West => write!(formatter,"West"),
		}
	}
}

impl FromStr for PortDirection
{
	type Err = String;
	fn from_str(text:&str) -> Result<PortDirection,String>
	{
		match text
		{
			"Local" => Ok(PortDirection::Local),
			"North" => Ok(PortDirection::North),
			"South" => Ok(PortDirection::South),
			"East" => Ok(PortDirection::East),
			"West" => Ok(PortDirection::West),
			_ =>
			{
				let sign=if let Some(_)=text.strip_prefix("lower")
				{
					AxisSign::Lower
				}
				else if let Some(_)=text.strip_prefix("upper")
				{
					AxisSign::Upper
				}
				else
				{
					return Err(format!("cannot parse port direction {}",text));
				};
				let dimension=text[5..].parse::<usize>().map_err(|e|format!("cannot parse port direction {}: {}",text,e))?;
				Ok(PortDirection::Axis{dimension,sign})
			}
		}
	}
}

///A Cartesian orthahedral region of arbitrary dimension.
#[derive(Debug)]
pub struct CartesianData
{
	pub sides: Vec<usize>,
	pub size: usize,
}

impl CartesianData
{
	pub fn new(sides:&[usize]) -> CartesianData
	{
		CartesianData{
			sides: sides.to_vec(),
			size: sides.iter().product(),
		}
	}
	///A k-ary n-cube has n sides of k routers each.
	pub fn new_cube(num_ary:usize, num_dim:usize) -> CartesianData
	{
		CartesianData::new(&vec![num_ary;num_dim])
	}
	pub fn unpack(&self, mut router_index:usize) -> Vec<usize>
	{
		if router_index>=self.size
		{
			panic!("router_index={} is greater than the size of the CartesianData={}",router_index,self.size);
		}
		let mut r=Vec::with_capacity(self.sides.len());
		for side in self.sides.iter()
		{
			r.push(router_index%side);
			router_index/=side;
		}
		r
	}
	pub fn pack(&self, coordinates:&[usize]) -> usize
	{
		for (c,s) in coordinates.iter().zip(self.sides.iter())
		{
			if *c>=*s
			{
				panic!("coordinate {} is greater than the side {}",c,s);
			}
		}
		let mut r=0;
		let mut stride=1;
		for (i,side) in self.sides.iter().enumerate()
		{
			r+=coordinates[i]*stride;
			stride*=side;
		}
		r
	}
	///The digit of a router in the given dimension.
	pub fn digit(&self, router_index:usize, dimension:usize) -> usize
	{
		let mut r=router_index;
		for d in 0..dimension
		{
			r/=self.sides[d];
		}
		r%self.sides[dimension]
	}
	///The neighbour of a router along an axis, wrapping around.
	pub fn cube_neighbour(&self, router_index:usize, dimension:usize, sign:AxisSign) -> usize
	{
		let side=self.sides[dimension];
		let mut coordinates=self.unpack(router_index);
		coordinates[dimension]=match sign
		{
			AxisSign::Upper => (coordinates[dimension]+1)%side,
			AxisSign::Lower => (coordinates[dimension]+side-1)%side,
		};
		self.pack(&coordinates)
	}
}

///Signed modular distance from `from` to `to` along a ring of `side` routers.
///Positive means the upper way is strictly shorter or both ways tie; the result is in `[-(side-1)/2, side/2]`.
pub fn ring_delta(from:usize, to:usize, side:usize) -> i32
{
	let forward=((to+side-from)%side) as i32;
	if (forward as usize)*2<=side
	{
		forward
	}
	else
	{
		forward - side as i32
	}
}

impl Quantifiable for CartesianData
{
	fn total_memory(&self) -> usize
	{
		size_of::<CartesianData>() + self.sides.capacity()*size_of::<usize>()
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

impl Quantifiable for PortDirection
{
	fn total_memory(&self) -> usize
	{
		size_of::<PortDirection>()
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
	fn pack_unpack()
	{
		let data=CartesianData::new_cube(3,2);
		assert_eq!( data.size, 9 );
		assert_eq!( data.unpack(4), vec![1,1] );
		assert_eq!( data.unpack(7), vec![1,2] );
		assert_eq!( data.pack(&[1,2]), 7 );
		for index in 0..data.size
		{
			assert_eq!( data.pack(&data.unpack(index)), index );
		}
		assert_eq!( data.digit(7,0), 1 );
		assert_eq!( data.digit(7,1), 2 );
	}
	#[test]
	fn neighbours_wrap()
	{
		let data=CartesianData::new_cube(3,2);
		assert_eq!( data.cube_neighbour(0,0,AxisSign::Upper), 1 );
		assert_eq!( data.cube_neighbour(0,0,AxisSign::Lower), 2 );
		assert_eq!( data.cube_neighbour(0,1,AxisSign::Lower), 6 );
		assert_eq!( data.cube_neighbour(8,1,AxisSign::Upper), 2 );
	}
	#[test]
	fn ring_deltas()
	{
		assert_eq!( ring_delta(0,1,3), 1 );
		assert_eq!( ring_delta(0,2,3), -1 );
		assert_eq!( ring_delta(2,0,3), 1 );
		assert_eq!( ring_delta(1,1,3), 0 );
		//On an even side the tie goes the upper way.
		assert_eq!( ring_delta(0,2,4), 2 );
		assert_eq!( ring_delta(0,3,4), -1 );
	}
	#[test]
	fn direction_names()
	{
		assert_eq!( PortDirection::lower(3).to_string(), "lower3" );
		assert_eq!( PortDirection::upper(2).to_string(), "upper2" );
		assert_eq!( PortDirection::Local.to_string(), "Local" );
		assert_eq!( "lower3".parse::<PortDirection>().unwrap(), PortDirection::lower(3) );
		assert_eq!( "upper12".parse::<PortDirection>().unwrap(), PortDirection::upper(12) );
		assert_eq!( "North".parse::<PortDirection>().unwrap(), PortDirection::North );
		assert!( "sideways2".parse::<PortDirection>().is_err() );
		assert_eq!( PortDirection::upper(0).reverse(), PortDirection::lower(0) );
		assert_eq!( PortDirection::East.reverse(), PortDirection::West );
	}
}
