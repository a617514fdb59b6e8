//! Shared test fixtures.

/// An R12 drawing with one quad 3DFACE, an instance of block `TRI` (one
/// triangle) at (100, 200, 0), and a LINE.
pub const TERRAIN_DXF: &str = "0
SECTION
2
HEADER
9
$ACADVER
1
AC1009
0
ENDSEC
0
SECTION
2
BLOCKS
0
BLOCK
8
0
2
TRI
70
0
10
0.0
20
0.0
30
0.0
3
TRI
0
3DFACE
8
0
10
0.0
20
0.0
30
0.0
11
1.0
21
0.0
31
0.0
12
0.0
22
1.0
32
0.0
13
0.0
23
1.0
33
0.0
0
ENDBLK
8
0
0
ENDSEC
0
SECTION
2
ENTITIES
0
3DFACE
8
0
10
0.0
20
0.0
30
0.0
11
1.0
21
0.0
31
0.0
12
1.0
22
1.0
32
0.0
13
0.0
23
1.0
33
0.0
0
INSERT
8
0
2
TRI
10
100.0
20
200.0
30
0.0
0
LINE
8
0
10
0.0
20
0.0
30
0.0
11
5.0
21
5.0
31
0.0
0
ENDSEC
0
EOF
";

/// An R12 drawing holding one polyface mesh: a unit square given as four
/// vertex records and one face record `1, 2, 3, -4`.
pub const POLYFACE_DXF: &str = "0
SECTION
2
HEADER
9
$ACADVER
1
AC1009
0
ENDSEC
0
SECTION
2
ENTITIES
0
POLYLINE
8
0
66
1
10
0.0
20
0.0
30
0.0
70
64
71
4
72
1
0
VERTEX
8
0
10
0.0
20
0.0
30
0.0
70
192
0
VERTEX
8
0
10
1.0
20
0.0
30
0.0
70
192
0
VERTEX
8
0
10
1.0
20
1.0
30
0.0
70
192
0
VERTEX
8
0
10
0.0
20
1.0
30
0.0
70
192
0
VERTEX
8
0
10
0.0
20
0.0
30
0.0
70
128
71
1
72
2
73
3
74
-4
0
SEQEND
8
0
0
ENDSEC
0
EOF
";
